//! # Triple Store Trait
//!
//! This is THE contract between the ordering engine and whatever holds the
//! document's statements. The engine owns nothing: every read is a pattern
//! query, every write an `add` or `remove` of a single statement.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory for testing/embedding |

pub mod memory;

use crate::model::{Pattern, Statement, Term};
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// TripleStore Trait
// ============================================================================

/// The universal store contract.
///
/// Methods take `&self`: stores use interior mutability so a store handle
/// can be shared between the engine and the creation callbacks it invokes.
/// Implementations need no locking beyond what keeps a single primitive
/// consistent; the engine is synchronous and runs each operation to
/// completion.
pub trait TripleStore {
    /// All statements matching `pattern`, in a stable encounter order.
    fn query(&self, pattern: &Pattern) -> Result<Vec<Statement>>;

    /// Add a statement. Returns `false` if it already existed.
    fn add(&self, statement: Statement) -> Result<bool>;

    /// Remove a statement. Returns `false` if it was not present.
    fn remove(&self, statement: &Statement) -> Result<bool>;

    /// Allocate a blank node that no statement mentions yet.
    fn fresh_blank_node(&self) -> Term;

    /// Number of statements held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every statement matching `pattern`. Returns how many went.
    ///
    /// Default: query, then remove one by one.
    fn remove_matches(&self, pattern: &Pattern) -> Result<usize> {
        let mut removed = 0;
        for statement in self.query(pattern)? {
            if self.remove(&statement)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// First object of `(subject, predicate, ?)`, if any.
    fn any_object(&self, subject: &Term, predicate: &Term) -> Result<Option<Term>> {
        let pattern = Pattern::any().subject(subject).predicate(predicate);
        Ok(self.query(&pattern)?.into_iter().next().map(|s| s.object))
    }

    /// All objects of `(subject, predicate, ?)`.
    fn objects(&self, subject: &Term, predicate: &Term) -> Result<Vec<Term>> {
        let pattern = Pattern::any().subject(subject).predicate(predicate);
        Ok(self.query(&pattern)?.into_iter().map(|s| s.object).collect())
    }

    /// All subjects of `(?, predicate, object)`.
    fn subjects(&self, predicate: &Term, object: &Term) -> Result<Vec<Term>> {
        let pattern = Pattern::any().predicate(predicate).object(object);
        Ok(self.query(&pattern)?.into_iter().map(|s| s.subject).collect())
    }
}
