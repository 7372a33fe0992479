//! # shape-order: explicit ordering for SHACL shape documents
//!
//! Property shapes carry their display position as a plain `sh:order`
//! literal; groups carry one too, and members are ordered within their
//! group. This crate keeps those numbers coherent while an editor moves,
//! drags, inserts, and deletes things.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `TripleStore` is the contract between the engine and storage
//! 2. **Clean DTOs**: `Term`, `Statement`, `Order` cross all boundaries
//! 3. **No cached state**: every operation reads the store fresh
//! 4. **Touch as little as possible**: moves swap, drops shift only crossed siblings
//!
//! ## Quick Start
//!
//! ```rust
//! use shape_order::{OrderingEngine, MemoryStore, Term, PropertyTemplate};
//!
//! # fn example() -> shape_order::Result<()> {
//! let engine = OrderingEngine::new(MemoryStore::new());
//! let shape = Term::iri("http://example.org/PersonShape");
//!
//! let name = engine.create_property(&shape, &PropertyTemplate::new(), None, None)?;
//! let email = engine.create_property(&shape, &PropertyTemplate::new(), None, None)?;
//!
//! engine.move_entity(&email, -1)?;
//! assert_eq!(engine.properties_of_shape(&shape)?.nodes(), vec![email, name]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | `accessor` | Read-only sorted views of shapes, groups, scopes |
//! | `mutator` | Order/group writes, create/remove, recompaction |
//! | `moves` | Single-step swap moves |
//! | `reconcile` | Drag-and-drop settlement |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod config;
pub mod accessor;
pub mod mutator;
pub mod moves;
pub mod reconcile;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{Term, Literal, Statement, Pattern, Order, Vocabulary};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use storage::{TripleStore, MemoryStore};

// ============================================================================
// Re-exports: Engine components
// ============================================================================

pub use config::{OrderingConfig, DuplicatePolicy};
pub use accessor::{Accessor, Scope, ScopeEntry, PropertiesList, ListEntry, PropertyView, GroupView};
pub use mutator::{Mutator, PropertyTemplate};
pub use moves::MoveOutcome;
pub use reconcile::{
    DragItem, ExistingEntity, EntityFactory, CreateContext, Payload,
    DropTarget, HoverSource, ReconcileReport,
};

// ============================================================================
// Top-level engine handle
// ============================================================================

/// The primary entry point. An `OrderingEngine` wraps a store and a
/// configuration and exposes every ordering operation.
///
/// The engine holds no document state of its own; the store may be shared
/// (e.g. a cloned [`MemoryStore`]) with other parts of the editor.
pub struct OrderingEngine<S: TripleStore> {
    store: S,
    config: OrderingConfig,
}

impl<S: TripleStore> OrderingEngine<S> {
    /// Create an engine with the default SHACL vocabulary.
    pub fn new(store: S) -> Self {
        Self::with_config(store, OrderingConfig::default())
    }

    pub fn with_config(store: S, config: OrderingConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &OrderingConfig {
        &self.config
    }

    pub fn accessor(&self) -> Accessor<'_, S> {
        Accessor::new(&self.store, &self.config.vocabulary)
    }

    pub fn mutator(&self) -> Mutator<'_, S> {
        Mutator::new(&self.store, &self.config.vocabulary)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn properties_of_shape(&self, shape: &Term) -> Result<PropertiesList> {
        self.accessor().properties_of_shape(shape)
    }

    pub fn properties_of_group(&self, group: &Term) -> Result<Vec<PropertyView>> {
        self.accessor().properties_of_group(group)
    }

    pub fn scope_of(&self, entity: &Term) -> Result<Option<Scope>> {
        self.accessor().scope_of(entity)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    pub fn set_order(&self, entity: &Term, order: Option<Order>) -> Result<bool> {
        self.mutator().set_order(entity, order)
    }

    pub fn set_group(&self, property: &Term, group: Option<&Term>) -> Result<bool> {
        self.mutator().set_group(property, group)
    }

    pub fn create_property(
        &self,
        shape: &Term,
        template: &PropertyTemplate,
        group: Option<&Term>,
        order: Option<Order>,
    ) -> Result<Term> {
        self.mutator().create_property(shape, template, group, order)
    }

    pub fn create_group(&self, label: Option<&str>, order: Option<Order>) -> Result<Term> {
        self.mutator().create_group(label, order)
    }

    pub fn remove_property(&self, property: &Term) -> Result<Vec<Term>> {
        self.mutator().remove_property(property)
    }

    pub fn recalculate(&self, scope: &Scope) -> Result<usize> {
        self.mutator().recalculate(scope)
    }

    /// Renumber a shape's top level and every group inside it.
    pub fn recalculate_shape(&self, shape: &Term) -> Result<usize> {
        self.recalculate(&Scope::Shape(shape.clone()))
    }

    pub fn ungroup(&self, shape: &Term, group: &Term) -> Result<bool> {
        self.mutator().ungroup(shape, group)
    }

    pub fn rename_shape(&self, old: &Term, new: &Term) -> Result<usize> {
        self.mutator().rename_shape(old, new)
    }

    // ========================================================================
    // Moves and drops
    // ========================================================================

    /// Swap `entity` with the sibling `offset` places away, if there is one.
    pub fn move_entity(&self, entity: &Term, offset: i64) -> Result<MoveOutcome> {
        moves::move_entity(
            &self.store,
            &self.config.vocabulary,
            self.config.duplicate_policy,
            entity,
            offset,
        )
    }

    /// Settle a drop of `items` onto `target` at the hovered position.
    pub fn reconcile(
        &self,
        items: Vec<DragItem<S>>,
        target: &DropTarget,
        hover: &dyn HoverSource,
    ) -> Result<ReconcileReport> {
        reconcile::reconcile(
            &self.store,
            &self.config.vocabulary,
            self.config.duplicate_policy,
            Payload::classify(items),
            target,
            hover,
        )
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Raised by `TripleStore` implementations backed by something fallible.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid order value: {0}")]
    InvalidOrder(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
