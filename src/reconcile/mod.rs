//! Batch reconciliation: settling a drag-and-drop onto a scope.
//!
//! The gesture layer classifies what is being dragged once, at drag start,
//! into [`DragItem`]s: factories for entities that do not exist yet, or
//! descriptors of existing entities. At drop time it hands over the payload,
//! the destination scope, and the hovered order. The engine then:
//!
//! 1. re-reads every existing entity from the store (descriptors are hints),
//! 2. splits them into siblings already in the destination scope and
//!    arrivals from another scope,
//! 3. shifts only the siblings the drop crosses (see [`shift`]),
//! 4. places the dropped entities at consecutive orders in their original
//!    display order, rewriting group membership together with order, then
//!    creates the new entities after them.

pub mod shift;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::accessor::{Accessor, Scope};
use crate::config::DuplicatePolicy;
use crate::model::{Order, Term, Vocabulary};
use crate::mutator::{Mutator, PropertyTemplate};
use crate::storage::TripleStore;
use crate::Result;

pub use shift::{plan, Shift, ShiftPlan};

// ============================================================================
// Payload
// ============================================================================

/// What a factory gets to work with when the engine asks it to create.
pub struct CreateContext<'a, S: ?Sized> {
    pub store: &'a S,
    pub vocabulary: &'a Vocabulary,
    pub shape: &'a Term,
}

/// Creates one new entity at a given order, optionally inside a group.
pub trait EntityFactory<S: ?Sized> {
    fn create(self: Box<Self>, ctx: &CreateContext<'_, S>, order: Order, group: Option<&Term>) -> Result<Term>;
}

impl<S: TripleStore + ?Sized> EntityFactory<S> for PropertyTemplate {
    fn create(self: Box<Self>, ctx: &CreateContext<'_, S>, order: Order, group: Option<&Term>) -> Result<Term> {
        Mutator::new(ctx.store, ctx.vocabulary).create_property(ctx.shape, &self, group, Some(order))
    }
}

impl<S: ?Sized, F> EntityFactory<S> for F
where
    F: FnOnce(&CreateContext<'_, S>, Order, Option<&Term>) -> Result<Term>,
{
    fn create(self: Box<Self>, ctx: &CreateContext<'_, S>, order: Order, group: Option<&Term>) -> Result<Term> {
        (*self)(ctx, order, group)
    }
}

/// An entity that already exists, as the gesture layer saw it at drag start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingEntity {
    pub node: Term,
    /// Order within its own scope.
    pub order: Order,
    /// The group it belonged to, if any.
    pub group: Option<Term>,
    /// That group's order in the top-level list.
    pub group_order: Option<Order>,
}

impl ExistingEntity {
    pub fn ungrouped(node: Term, order: Order) -> Self {
        Self { node, order, group: None, group_order: None }
    }

    pub fn in_group(node: Term, order: Order, group: Term, group_order: Order) -> Self {
        Self { node, order, group: Some(group), group_order: Some(group_order) }
    }

    /// Position in the rendered list: top-level slot, then slot within a group.
    fn display_key(&self) -> (f64, f64) {
        match self.group_order {
            Some(group_order) => (group_order.value(), self.order.value()),
            None => (self.order.value(), f64::MIN),
        }
    }
}

/// One dragged element, tagged at drag start.
pub enum DragItem<S: ?Sized> {
    New(Box<dyn EntityFactory<S>>),
    Existing(ExistingEntity),
}

impl<S: TripleStore + ?Sized> DragItem<S> {
    /// A brand-new property built from `template`.
    pub fn new_property(template: PropertyTemplate) -> Self {
        DragItem::New(Box::new(template))
    }
}

impl<S: ?Sized> DragItem<S> {
    /// A brand-new entity built by a callback.
    pub fn create_with<F>(f: F) -> Self
    where
        F: FnOnce(&CreateContext<'_, S>, Order, Option<&Term>) -> Result<Term> + 'static,
    {
        DragItem::New(Box::new(f))
    }

    pub fn existing(entity: ExistingEntity) -> Self {
        DragItem::Existing(entity)
    }
}

impl<S: ?Sized> fmt::Debug for DragItem<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DragItem::New(_) => f.write_str("DragItem::New(..)"),
            DragItem::Existing(e) => f.debug_tuple("DragItem::Existing").field(e).finish(),
        }
    }
}

/// A classified drop payload.
pub struct Payload<S: ?Sized> {
    pub new: Vec<Box<dyn EntityFactory<S>>>,
    /// Existing entities in display order, each node once.
    pub existing: Vec<ExistingEntity>,
}

impl<S: ?Sized> Payload<S> {
    pub fn classify(items: impl IntoIterator<Item = DragItem<S>>) -> Self {
        let mut new = Vec::new();
        let mut existing: Vec<ExistingEntity> = Vec::new();
        for item in items {
            match item {
                DragItem::New(factory) => new.push(factory),
                DragItem::Existing(entity) if existing.iter().any(|e| e.node == entity.node) => {
                    tracing::trace!(entity = %entity.node, "duplicate drag item dropped");
                }
                DragItem::Existing(entity) => existing.push(entity),
            }
        }
        existing.sort_by(|a, b| {
            let (a, b) = (a.display_key(), b.display_key());
            a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1))
        });
        Self { new, existing }
    }

    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.existing.is_empty()
    }
}

// ============================================================================
// Target
// ============================================================================

/// The scope being dropped into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    pub shape: Term,
    /// Destination group; `None` drops into the shape's top level.
    pub group: Option<Term>,
}

impl DropTarget {
    pub fn top_level(shape: Term) -> Self {
        Self { shape, group: None }
    }

    pub fn group(shape: Term, group: Term) -> Self {
        Self { shape, group: Some(group) }
    }

    pub fn scope(&self) -> Scope {
        match &self.group {
            Some(group) => Scope::Group { shape: self.shape.clone(), group: group.clone() },
            None => Scope::Shape(self.shape.clone()),
        }
    }
}

/// Where the pointer is: the order of the hovered sibling, if any.
pub trait HoverSource {
    fn hovered_order(&self) -> Option<Order>;
}

impl HoverSource for Option<Order> {
    fn hovered_order(&self) -> Option<Order> {
        *self
    }
}

impl HoverSource for Order {
    fn hovered_order(&self) -> Option<Order> {
        Some(*self)
    }
}

// ============================================================================
// Report
// ============================================================================

/// Everything a drop changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// The order the block was dropped at; `None` if nothing was hovered.
    pub target: Option<Order>,
    /// Siblings moved out of the way.
    pub shifted: Vec<Shift>,
    /// Existing entities placed at their new order.
    pub placed: Vec<(Term, Order)>,
    /// Newly created entities and their order.
    pub created: Vec<(Term, Order)>,
    /// Existing entities that could not be relocated.
    pub skipped: Vec<Term>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.shifted.is_empty() && self.placed.is_empty() && self.created.is_empty()
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

/// Existing entity resolved against the store.
struct Resolved {
    node: Term,
    /// Current order when already a sibling in the destination scope.
    in_scope_order: Option<Order>,
}

/// Settle a drop of `payload` onto `target` at the hovered position.
pub fn reconcile<S: TripleStore + ?Sized>(
    store: &S,
    vocab: &Vocabulary,
    policy: DuplicatePolicy,
    payload: Payload<S>,
    target: &DropTarget,
    hover: &dyn HoverSource,
) -> Result<ReconcileReport> {
    let Some(mut target_order) = hover.hovered_order() else {
        tracing::trace!("drop without hover target ignored");
        return Ok(ReconcileReport::default());
    };
    let mut report = ReconcileReport { target: Some(target_order), ..Default::default() };
    if payload.is_empty() {
        return Ok(report);
    }

    let accessor = Accessor::new(store, vocab);
    let mutator = Mutator::new(store, vocab);
    let scope = target.scope();

    if policy == DuplicatePolicy::Recompact && !accessor.duplicate_orders(&scope)?.is_empty() {
        let hovered = accessor
            .scope_entries(&scope)?
            .into_iter()
            .find(|e| e.order == Some(target_order))
            .map(|e| e.node);
        mutator.recalculate(&scope)?;
        if let Some(node) = hovered {
            target_order = accessor.order_of(&node)?.unwrap_or(target_order);
            report.target = Some(target_order);
        }
    }

    // Fresh state for every dragged entity; the block keeps payload order.
    let mut block: Vec<Resolved> = Vec::new();
    for entity in &payload.existing {
        match resolve(&accessor, &scope, entity)? {
            Some(resolved) => block.push(resolved),
            None => report.skipped.push(entity.node.clone()),
        }
    }

    let siblings: Vec<_> = accessor
        .scope_entries(&scope)?
        .into_iter()
        .filter(|e| !block.iter().any(|r| r.node == e.node))
        .collect();
    let dragged_orders: Vec<Order> = block.iter().filter_map(|r| r.in_scope_order).collect();
    let inserted = block.len() - dragged_orders.len() + payload.new.len();
    if block.is_empty() && payload.new.is_empty() {
        return Ok(report);
    }

    let plan = shift::plan(&siblings, &dragged_orders, inserted, target_order);
    for s in &plan.shifts {
        mutator.set_order(&s.node, Some(s.to))?;
    }

    let group = target.group.as_ref();
    let mut next = plan.slot;
    for node in block.into_iter().map(|r| r.node) {
        mutator.set_group(&node, group)?;
        mutator.set_order(&node, Some(next))?;
        report.placed.push((node, next));
        next = next.offset(1);
    }

    let ctx = CreateContext { store, vocabulary: vocab, shape: &target.shape };
    for factory in payload.new {
        let node = factory.create(&ctx, next, group)?;
        report.created.push((node, next));
        next = next.offset(1);
    }

    tracing::debug!(
        ?scope,
        target = %target_order,
        slot = %plan.slot,
        moving_down = plan.moving_down,
        shifted = plan.shifts.len(),
        placed = report.placed.len(),
        created = report.created.len(),
        "reconciled drop"
    );
    report.shifted = plan.shifts;
    Ok(report)
}

/// Locate a dragged entity relative to the destination scope.
///
/// `None` when the entity cannot be moved there: it is in no shape, it
/// belongs to a different shape, or it is a group headed into a group.
fn resolve<S: TripleStore + ?Sized>(
    accessor: &Accessor<'_, S>,
    scope: &Scope,
    entity: &ExistingEntity,
) -> Result<Option<Resolved>> {
    let Some(current) = accessor.scope_of(&entity.node)? else {
        tracing::warn!(entity = %entity.node, "dragged entity is in no scope; skipping");
        return Ok(None);
    };
    if current.shape() != scope.shape() {
        tracing::warn!(entity = %entity.node, from = %current.shape(), to = %scope.shape(), "cross-shape drop; skipping");
        return Ok(None);
    }
    let is_group = accessor.owning_shapes(&entity.node)?.is_empty();
    if is_group && scope.group().is_some() {
        tracing::warn!(entity = %entity.node, "groups cannot nest; skipping");
        return Ok(None);
    }

    let in_scope_order = if &current == scope { accessor.order_of(&entity.node)? } else { None };
    Ok(Some(Resolved { node: entity.node.clone(), in_scope_order }))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    fn shape() -> Term {
        Term::iri("http://example.org/Shape")
    }

    fn o(n: u32) -> Option<Order> {
        Some(Order::from(n))
    }

    fn setup(orders: &[u32]) -> (MemoryStore, Vocabulary, Vec<Term>) {
        let store = MemoryStore::new();
        let v = Vocabulary::default();
        let nodes = {
            let m = Mutator::new(&store, &v);
            orders
                .iter()
                .map(|&n| m.create_property(&shape(), &PropertyTemplate::new(), None, o(n)).unwrap())
                .collect()
        };
        (store, v, nodes)
    }

    fn order_of(store: &MemoryStore, v: &Vocabulary, n: &Term) -> Option<Order> {
        Accessor::new(store, v).order_of(n).unwrap()
    }

    fn drop_at(
        store: &MemoryStore,
        v: &Vocabulary,
        items: Vec<DragItem<MemoryStore>>,
        target: &DropTarget,
        hovered: Option<Order>,
    ) -> ReconcileReport {
        reconcile(store, v, DuplicatePolicy::Tolerate, Payload::classify(items), target, &hovered).unwrap()
    }

    #[test]
    fn test_no_hover_is_noop() {
        let (store, v, p) = setup(&[0, 1]);
        let rev = store.revision();
        let report = drop_at(
            &store,
            &v,
            vec![DragItem::existing(ExistingEntity::ungrouped(p[1].clone(), Order::from(1u32)))],
            &DropTarget::top_level(shape()),
            None,
        );
        assert!(report.is_noop());
        assert_eq!(report.target, None);
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn test_insert_new_properties() {
        let (store, v, p) = setup(&[0, 1, 2, 3]);
        let items = vec![
            DragItem::new_property(PropertyTemplate::new().with_name("first")),
            DragItem::new_property(PropertyTemplate::new().with_name("second")),
        ];
        let report = drop_at(&store, &v, items, &DropTarget::top_level(shape()), o(2));

        let existing: Vec<_> = p.iter().map(|n| order_of(&store, &v, n)).collect();
        assert_eq!(existing, vec![o(0), o(1), o(4), o(5)]);
        let created: Vec<_> = report.created.iter().map(|(_, order)| Some(*order)).collect();
        assert_eq!(created, vec![o(2), o(3)]);
        let names: Vec<_> = report
            .created
            .iter()
            .map(|(n, _)| Accessor::new(&store, &v).property_view(n).unwrap().name)
            .collect();
        assert_eq!(names, vec![Some(Term::string("first")), Some(Term::string("second"))]);
    }

    #[test]
    fn test_relocate_up_shifts_only_crossed() {
        let (store, v, p) = setup(&[0, 1, 2, 3, 4]);
        let report = drop_at(
            &store,
            &v,
            vec![DragItem::existing(ExistingEntity::ungrouped(p[4].clone(), Order::from(4u32)))],
            &DropTarget::top_level(shape()),
            o(1),
        );
        let orders: Vec<_> = p.iter().map(|n| order_of(&store, &v, n)).collect();
        assert_eq!(orders, vec![o(0), o(2), o(3), o(4), o(1)]);
        assert_eq!(report.shifted.len(), 3);
    }

    #[test]
    fn test_relocate_into_group_sets_membership() {
        let store = MemoryStore::new();
        let v = Vocabulary::default();
        let m = Mutator::new(&store, &v);
        let loose = m.create_property(&shape(), &PropertyTemplate::new(), None, o(0)).unwrap();
        let g = m.create_group(Some("G"), o(1)).unwrap();
        let a = m.create_property(&shape(), &PropertyTemplate::new(), Some(&g), o(0)).unwrap();
        let b = m.create_property(&shape(), &PropertyTemplate::new(), Some(&g), o(1)).unwrap();

        drop_at(
            &store,
            &v,
            vec![DragItem::existing(ExistingEntity::ungrouped(loose.clone(), Order::ZERO))],
            &DropTarget::group(shape(), g.clone()),
            o(1),
        );

        let list = Accessor::new(&store, &v).properties_of_shape(&shape()).unwrap();
        assert_eq!(list.nodes(), vec![g.clone()]);
        let members: Vec<_> = list.group(&g).unwrap().properties.iter().map(|p| p.node.clone()).collect();
        assert_eq!(members, vec![a, loose, b]);
    }

    #[test]
    fn test_drag_out_of_group_clears_membership() {
        let store = MemoryStore::new();
        let v = Vocabulary::default();
        let m = Mutator::new(&store, &v);
        let top = m.create_property(&shape(), &PropertyTemplate::new(), None, o(0)).unwrap();
        let g = m.create_group(None, o(1)).unwrap();
        let a = m.create_property(&shape(), &PropertyTemplate::new(), Some(&g), o(0)).unwrap();
        let b = m.create_property(&shape(), &PropertyTemplate::new(), Some(&g), o(1)).unwrap();

        drop_at(
            &store,
            &v,
            vec![DragItem::existing(ExistingEntity::in_group(b.clone(), o(1).unwrap(), g.clone(), o(1).unwrap()))],
            &DropTarget::top_level(shape()),
            o(0),
        );

        let acc = Accessor::new(&store, &v);
        assert_eq!(acc.group_of(&b).unwrap(), None);
        assert_eq!(acc.properties_of_shape(&shape()).unwrap().nodes(), vec![b, top, g]);
        assert_eq!(acc.order_of(&a).unwrap(), o(0));
    }

    #[test]
    fn test_unknown_entity_is_skipped() {
        let (store, v, _) = setup(&[0, 1]);
        let ghost = Term::blank("ghost");
        let rev = store.revision();
        let report = drop_at(
            &store,
            &v,
            vec![DragItem::existing(ExistingEntity::ungrouped(ghost.clone(), Order::ZERO))],
            &DropTarget::top_level(shape()),
            o(1),
        );
        assert_eq!(report.skipped, vec![ghost]);
        assert!(report.is_noop());
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn test_callback_factory_receives_order_and_group() {
        let (store, v, _) = setup(&[0]);
        let g = Mutator::new(&store, &v).create_group(None, None).unwrap();
        let seen = std::rc::Rc::new(std::cell::RefCell::new(None));
        let sink = seen.clone();
        let item = DragItem::create_with(move |ctx: &CreateContext<'_, MemoryStore>, order, group| {
            *sink.borrow_mut() = Some((order, group.cloned()));
            Mutator::new(ctx.store, ctx.vocabulary).create_property(ctx.shape, &PropertyTemplate::new(), group, Some(order))
        });

        drop_at(&store, &v, vec![item], &DropTarget::group(shape(), g.clone()), o(0));
        assert_eq!(*seen.borrow(), Some((Order::ZERO, Some(g))));
    }

    #[test]
    fn test_classify_sorts_existing_by_display_position() {
        let g = Term::blank("g");
        let items: Vec<DragItem<MemoryStore>> = vec![
            DragItem::existing(ExistingEntity::ungrouped(Term::blank("late"), Order::from(3u32))),
            DragItem::existing(ExistingEntity::in_group(Term::blank("inner"), Order::ZERO, g, Order::from(1u32))),
            DragItem::new_property(PropertyTemplate::new()),
            DragItem::existing(ExistingEntity::ungrouped(Term::blank("early"), Order::from(1u32))),
        ];
        let payload = Payload::classify(items);
        let nodes: Vec<_> = payload.existing.iter().map(|e| e.node.clone()).collect();
        assert_eq!(nodes, vec![Term::blank("early"), Term::blank("inner"), Term::blank("late")]);
        assert_eq!(payload.new.len(), 1);
    }

    #[test]
    fn test_classify_drops_repeated_nodes() {
        let a = Term::blank("a");
        let items: Vec<DragItem<MemoryStore>> = vec![
            DragItem::existing(ExistingEntity::ungrouped(a.clone(), Order::from(2u32))),
            DragItem::existing(ExistingEntity::ungrouped(a.clone(), Order::from(2u32))),
        ];
        let payload = Payload::classify(items);
        assert_eq!(payload.existing.len(), 1);
    }

    #[test]
    fn test_repeated_item_leaves_no_gap() {
        let (store, v, p) = setup(&[0, 1, 2, 3]);
        let item = || DragItem::existing(ExistingEntity::ungrouped(p[3].clone(), Order::from(3u32)));
        drop_at(&store, &v, vec![item(), item()], &DropTarget::top_level(shape()), o(1));

        let orders: Vec<_> = p.iter().map(|n| order_of(&store, &v, n)).collect();
        assert_eq!(orders, vec![o(0), o(2), o(3), o(1)]);
    }

    #[test]
    fn test_block_keeps_display_order_across_scopes() {
        // a0, G1{x0, y1}, b2, c3; drag x and b onto a
        let store = MemoryStore::new();
        let v = Vocabulary::default();
        let m = Mutator::new(&store, &v);
        let a = m.create_property(&shape(), &PropertyTemplate::new(), None, o(0)).unwrap();
        let g = m.create_group(None, o(1)).unwrap();
        let x = m.create_property(&shape(), &PropertyTemplate::new(), Some(&g), o(0)).unwrap();
        let y = m.create_property(&shape(), &PropertyTemplate::new(), Some(&g), o(1)).unwrap();
        let b = m.create_property(&shape(), &PropertyTemplate::new(), None, o(2)).unwrap();
        let c = m.create_property(&shape(), &PropertyTemplate::new(), None, o(3)).unwrap();

        let items = vec![
            DragItem::existing(ExistingEntity::ungrouped(b.clone(), Order::from(2u32))),
            DragItem::existing(ExistingEntity::in_group(x.clone(), Order::ZERO, g.clone(), Order::from(1u32))),
        ];
        let report = drop_at(&store, &v, items, &DropTarget::top_level(shape()), o(0));
        assert_eq!(report.placed, vec![(x.clone(), Order::ZERO), (b.clone(), Order::from(1u32))]);

        let list = Accessor::new(&store, &v).properties_of_shape(&shape()).unwrap();
        assert_eq!(list.nodes(), vec![x, b, a, g.clone(), c]);
        assert_eq!(list.orders(), vec![o(0), o(1), o(2), o(3), o(4)]);
        let members: Vec<_> = list.group(&g).unwrap().properties.iter().map(|p| p.node.clone()).collect();
        assert_eq!(members, vec![y]);
    }
}
