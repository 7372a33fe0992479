//! Single-step moves ("move up" / "move down").
//!
//! A move is a swap: the entity trades order values with the sibling that
//! sits exactly `offset` positions away. Only two statements change. When no
//! sibling holds that order the entity is at a boundary and nothing happens.

use serde::{Deserialize, Serialize};

use crate::accessor::{Accessor, Scope};
use crate::config::DuplicatePolicy;
use crate::model::{Order, Term, Vocabulary};
use crate::mutator::Mutator;
use crate::storage::TripleStore;
use crate::Result;

/// What a move did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// Swapped order values with `with`.
    Swapped { with: Term, from: Order, to: Order },
    /// No sibling at the target order.
    Boundary,
    /// Zero offset.
    Stationary,
    /// The entity has no (valid) order to move from.
    NotOrdered,
    /// The entity belongs to no scope.
    NotFound,
}

impl MoveOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, MoveOutcome::Swapped { .. })
    }
}

/// Move `entity` by `offset` places within its sibling scope.
pub fn move_entity<S: TripleStore + ?Sized>(
    store: &S,
    vocab: &Vocabulary,
    policy: DuplicatePolicy,
    entity: &Term,
    offset: i64,
) -> Result<MoveOutcome> {
    if offset == 0 {
        return Ok(MoveOutcome::Stationary);
    }

    let accessor = Accessor::new(store, vocab);
    let mutator = Mutator::new(store, vocab);

    let Some(scope) = accessor.scope_of(entity)? else {
        return Ok(MoveOutcome::NotFound);
    };
    if policy == DuplicatePolicy::Recompact && !accessor.duplicate_orders(&scope)?.is_empty() {
        mutator.recalculate(&scope)?;
    }
    let Some(current) = accessor.order_of(entity)? else {
        return Ok(MoveOutcome::NotOrdered);
    };

    let target = current.offset(offset);
    let Some((neighbor, neighbor_order)) = closest_sibling(&accessor, &scope, entity, target)? else {
        return Ok(MoveOutcome::Boundary);
    };
    if neighbor_order != target {
        return Ok(MoveOutcome::Boundary);
    }

    mutator.set_order(entity, Some(target))?;
    mutator.set_order(&neighbor, Some(current))?;
    tracing::debug!(%entity, %neighbor, from = %current, to = %target, "swapped");

    Ok(MoveOutcome::Swapped { with: neighbor, from: current, to: target })
}

/// Ordered sibling whose order is nearest `target`; first encountered wins ties.
fn closest_sibling<S: TripleStore + ?Sized>(
    accessor: &Accessor<'_, S>,
    scope: &Scope,
    entity: &Term,
    target: Order,
) -> Result<Option<(Term, Order)>> {
    let distance = |o: Order| (o.value() - target.value()).abs();
    let mut best: Option<(Term, Order)> = None;
    for sibling in accessor.scope_entries(scope)? {
        if &sibling.node == entity {
            continue;
        }
        let Some(order) = sibling.order else { continue };
        let closer = best.as_ref().is_none_or(|(_, b)| distance(order) < distance(*b));
        if closer {
            best = Some((sibling.node, order));
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutator::PropertyTemplate;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    fn shape() -> Term {
        Term::iri("http://example.org/Shape")
    }

    fn setup(orders: &[u32]) -> (MemoryStore, Vocabulary, Vec<Term>) {
        let store = MemoryStore::new();
        let v = Vocabulary::default();
        let nodes = {
            let m = Mutator::new(&store, &v);
            orders
                .iter()
                .map(|&n| {
                    m.create_property(&shape(), &PropertyTemplate::new(), None, Some(Order::from(n)))
                        .unwrap()
                })
                .collect()
        };
        (store, v, nodes)
    }

    fn order_of(store: &MemoryStore, v: &Vocabulary, n: &Term) -> Option<Order> {
        Accessor::new(store, v).order_of(n).unwrap()
    }

    fn o(n: u32) -> Option<Order> {
        Some(Order::from(n))
    }

    #[test]
    fn test_move_down_swaps_with_next() {
        let (store, v, p) = setup(&[0, 1, 2]);
        let outcome = move_entity(&store, &v, DuplicatePolicy::Tolerate, &p[0], 1).unwrap();
        assert!(outcome.moved());
        assert_eq!(order_of(&store, &v, &p[0]), o(1));
        assert_eq!(order_of(&store, &v, &p[1]), o(0));
        assert_eq!(order_of(&store, &v, &p[2]), o(2));
    }

    #[test]
    fn test_move_up_swaps_with_previous() {
        let (store, v, p) = setup(&[0, 1, 2]);
        move_entity(&store, &v, DuplicatePolicy::Tolerate, &p[2], -1).unwrap();
        assert_eq!(order_of(&store, &v, &p[1]), o(2));
        assert_eq!(order_of(&store, &v, &p[2]), o(1));
    }

    #[test]
    fn test_boundary_is_noop() {
        let (store, v, p) = setup(&[0, 1, 2]);
        let rev = store.revision();
        let outcome = move_entity(&store, &v, DuplicatePolicy::Tolerate, &p[2], 1).unwrap();
        assert_eq!(outcome, MoveOutcome::Boundary);
        assert_eq!(store.revision(), rev);

        let outcome = move_entity(&store, &v, DuplicatePolicy::Tolerate, &p[0], -1).unwrap();
        assert_eq!(outcome, MoveOutcome::Boundary);
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn test_gap_is_boundary() {
        let (store, v, p) = setup(&[0, 5]);
        let outcome = move_entity(&store, &v, DuplicatePolicy::Tolerate, &p[0], 1).unwrap();
        assert_eq!(outcome, MoveOutcome::Boundary);
    }

    #[test]
    fn test_zero_offset_and_unknown_entity() {
        let (store, v, p) = setup(&[0, 1]);
        assert_eq!(
            move_entity(&store, &v, DuplicatePolicy::Tolerate, &p[0], 0).unwrap(),
            MoveOutcome::Stationary
        );
        assert_eq!(
            move_entity(&store, &v, DuplicatePolicy::Tolerate, &Term::blank("ghost"), 1).unwrap(),
            MoveOutcome::NotFound
        );
    }

    #[test]
    fn test_unordered_entity() {
        let (store, v, p) = setup(&[0, 1]);
        Mutator::new(&store, &v).set_order(&p[1], None).unwrap();
        assert_eq!(
            move_entity(&store, &v, DuplicatePolicy::Tolerate, &p[1], -1).unwrap(),
            MoveOutcome::NotOrdered
        );
    }

    #[test]
    fn test_move_within_group_ignores_top_level() {
        let store = MemoryStore::new();
        let v = Vocabulary::default();
        let m = Mutator::new(&store, &v);
        let top = m.create_property(&shape(), &PropertyTemplate::new(), None, o(1)).unwrap();
        let g = m.create_group(None, o(0)).unwrap();
        let a = m.create_property(&shape(), &PropertyTemplate::new(), Some(&g), o(0)).unwrap();
        let b = m.create_property(&shape(), &PropertyTemplate::new(), Some(&g), o(1)).unwrap();

        let outcome = move_entity(&store, &v, DuplicatePolicy::Tolerate, &a, 1).unwrap();
        assert_eq!(outcome, MoveOutcome::Swapped { with: b.clone(), from: Order::ZERO, to: Order::from(1u32) });
        assert_eq!(order_of(&store, &v, &top), o(1));
        assert_eq!(order_of(&store, &v, &g), o(0));
    }

    #[test]
    fn test_group_moves_in_top_level() {
        let store = MemoryStore::new();
        let v = Vocabulary::default();
        let m = Mutator::new(&store, &v);
        let top = m.create_property(&shape(), &PropertyTemplate::new(), None, o(0)).unwrap();
        let g = m.create_group(None, o(1)).unwrap();
        m.create_property(&shape(), &PropertyTemplate::new(), Some(&g), o(0)).unwrap();

        move_entity(&store, &v, DuplicatePolicy::Tolerate, &g, -1).unwrap();
        assert_eq!(order_of(&store, &v, &g), o(0));
        assert_eq!(order_of(&store, &v, &top), o(1));
    }

    #[test]
    fn test_recompact_policy_repairs_duplicates_first() {
        let (store, v, p) = setup(&[0, 0, 1]);
        let outcome = move_entity(&store, &v, DuplicatePolicy::Recompact, &p[1], -1).unwrap();
        assert!(outcome.moved());
        let list = Accessor::new(&store, &v).properties_of_shape(&shape()).unwrap();
        assert_eq!(list.nodes(), vec![p[1].clone(), p[0].clone(), p[2].clone()]);
        assert_eq!(list.orders(), vec![o(0), o(1), o(2)]);
    }
}
