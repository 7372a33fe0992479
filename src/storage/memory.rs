//! In-memory triple store.
//!
//! This is the reference implementation of `TripleStore`.
//! It keeps statements in insertion order behind a single RwLock, with a
//! hash set alongside for duplicate detection.
//!
//! ## Limitations
//!
//! - **No indexes**: every `query()` is a full scan. Documents edited in
//!   the shape editor hold a few thousand statements at most.
//! - **No transactions**: writes are applied immediately. Each primitive is
//!   atomic on its own; multi-statement operations are not.
//!
//! Use this store for:
//! - Testing the accessor, mutator, and reconciliation engine
//! - Embedding the engine where the document is already in memory

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::model::{Pattern, Statement, Term};
use crate::Result;
use super::TripleStore;

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory statement storage. Cloning shares the same statements.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    triples: RwLock<Triples>,
    next_blank: AtomicU64,
    /// Bumped on every successful add/remove.
    revision: AtomicU64,
}

#[derive(Default)]
struct Triples {
    ordered: Vec<Statement>,
    present: HashSet<Statement>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-loaded with statements (duplicates dropped).
    pub fn with_statements(statements: impl IntoIterator<Item = Statement>) -> Self {
        let store = Self::new();
        {
            let mut triples = store.inner.triples.write();
            for statement in statements {
                if triples.present.insert(statement.clone()) {
                    triples.ordered.push(statement);
                }
            }
        }
        store
    }

    /// Snapshot of every statement, in insertion order.
    pub fn statements(&self) -> Vec<Statement> {
        self.inner.triples.read().ordered.clone()
    }

    /// Snapshot as a set, for order-insensitive comparison.
    pub fn statement_set(&self) -> HashSet<Statement> {
        self.inner.triples.read().present.clone()
    }

    /// Number of successful mutations since creation.
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::Relaxed)
    }

    fn is_mentioned(triples: &Triples, term: &Term) -> bool {
        triples.ordered.iter().any(|s| s.mentions(term) || s.predicate == *term)
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("statements", &self.len())
            .field("revision", &self.revision())
            .finish()
    }
}

// ============================================================================
// TripleStore impl
// ============================================================================

impl TripleStore for MemoryStore {
    fn query(&self, pattern: &Pattern) -> Result<Vec<Statement>> {
        let triples = self.inner.triples.read();
        Ok(triples
            .ordered
            .iter()
            .filter(|s| pattern.matches(s))
            .cloned()
            .collect())
    }

    fn add(&self, statement: Statement) -> Result<bool> {
        let mut triples = self.inner.triples.write();
        if !triples.present.insert(statement.clone()) {
            return Ok(false);
        }
        triples.ordered.push(statement);
        self.inner.revision.fetch_add(1, Ordering::Relaxed);
        Ok(true)
    }

    fn remove(&self, statement: &Statement) -> Result<bool> {
        let mut triples = self.inner.triples.write();
        if !triples.present.remove(statement) {
            return Ok(false);
        }
        triples.ordered.retain(|s| s != statement);
        self.inner.revision.fetch_add(1, Ordering::Relaxed);
        Ok(true)
    }

    fn remove_matches(&self, pattern: &Pattern) -> Result<usize> {
        let mut triples = self.inner.triples.write();
        let before = triples.ordered.len();
        let Triples { ordered, present } = &mut *triples;
        ordered.retain(|s| {
            let hit = pattern.matches(s);
            if hit {
                present.remove(s);
            }
            !hit
        });
        let removed = before - triples.ordered.len();
        if removed > 0 {
            self.inner.revision.fetch_add(removed as u64, Ordering::Relaxed);
        }
        Ok(removed)
    }

    fn fresh_blank_node(&self) -> Term {
        let triples = self.inner.triples.read();
        loop {
            let n = self.inner.next_blank.fetch_add(1, Ordering::Relaxed);
            let candidate = Term::blank(format!("n{n}"));
            if !Self::is_mentioned(&triples, &candidate) {
                return candidate;
            }
        }
    }

    fn len(&self) -> usize {
        self.inner.triples.read().ordered.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
