//! Shift planning for a drop: pure arithmetic, no store access.
//!
//! Given the siblings left in place, the current orders of the dragged
//! siblings (`D`), the number of entities arriving from elsewhere or being
//! created (`I`), and the hovered order `t`:
//!
//! ```text
//! moving down (min D < t):  slot s = t − |{d ∈ D : d ≤ t}| + 1
//! otherwise:                slot s = t
//!
//! for each remaining sibling p with an order:
//!     r(p) = p − |{d ∈ D : d < p}|          close the holes the drag leaves
//!     new  = r(p) + (|D| + I)  if r(p) ≥ s  open room for the block
//!            r(p)              otherwise
//! ```
//!
//! The block of dropped entities then takes `s, s+1, …`.
//!
//! With `D` empty this is the uniform gap shift: every sibling at or after
//! `t` moves up by `I`. With a single dragged sibling it is the minimal
//! directional shift: only siblings between the old and new position move,
//! by exactly one. Siblings above both positions net to zero and are left
//! untouched, as are siblings without an order.

use crate::accessor::ScopeEntry;
use crate::model::{Order, Term};

/// One sibling's order change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shift {
    pub node: Term,
    pub from: Order,
    pub to: Order,
}

/// The order changes for the siblings plus where the dropped block starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftPlan {
    pub shifts: Vec<Shift>,
    pub slot: Order,
    pub moving_down: bool,
}

/// Plan a drop. `siblings` must not contain the dragged entities.
pub fn plan(siblings: &[ScopeEntry], dragged: &[Order], inserted: usize, target: Order) -> ShiftPlan {
    let moving_down = dragged.iter().min().is_some_and(|&m| m < target);
    let block = (dragged.len() + inserted) as i64;

    let count = |pred: &dyn Fn(Order) -> bool| dragged.iter().filter(|&&d| pred(d)).count() as i64;

    let slot = if moving_down {
        target.offset(1 - count(&|d| d <= target))
    } else {
        target
    };

    let mut shifts = Vec::new();
    for sibling in siblings {
        let Some(from) = sibling.order else { continue };
        let compacted = from.offset(-count(&|d| d < from));
        let to = if compacted >= slot { compacted.offset(block) } else { compacted };
        if to != from {
            shifts.push(Shift { node: sibling.node.clone(), from, to });
        }
    }

    ShiftPlan { shifts, slot, moving_down }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn siblings(orders: &[u32]) -> Vec<ScopeEntry> {
        orders
            .iter()
            .map(|&o| ScopeEntry { node: Term::blank(format!("p{o}")), order: Some(Order::from(o)) })
            .collect()
    }

    fn moves(plan: &ShiftPlan) -> Vec<(u32, u32)> {
        plan.shifts
            .iter()
            .map(|s| (s.from.value() as u32, s.to.value() as u32))
            .collect()
    }

    fn ord(n: u32) -> Order {
        Order::from(n)
    }

    #[test]
    fn uniform_shift_for_pure_insertion() {
        let plan = plan(&siblings(&[0, 1, 2, 3]), &[], 2, ord(2));
        assert_eq!(moves(&plan), vec![(2, 4), (3, 5)]);
        assert_eq!(plan.slot, ord(2));
        assert!(!plan.moving_down);
    }

    #[test]
    fn single_item_moving_up() {
        // [0..4], drag 4 onto 1
        let plan = plan(&siblings(&[0, 1, 2, 3]), &[ord(4)], 0, ord(1));
        assert_eq!(moves(&plan), vec![(1, 2), (2, 3), (3, 4)]);
        assert_eq!(plan.slot, ord(1));
    }

    #[test]
    fn single_item_moving_down() {
        // [0..4], drag 0 onto 3
        let plan = plan(&siblings(&[1, 2, 3, 4]), &[ord(0)], 0, ord(3));
        assert_eq!(moves(&plan), vec![(1, 0), (2, 1), (3, 2)]);
        assert_eq!(plan.slot, ord(3));
        assert!(plan.moving_down);
    }

    #[test]
    fn contiguous_block_moving_down() {
        // [0..4], drag {0,1} onto 3: block lands on 2,3 and 4 stays
        let plan = plan(&siblings(&[2, 3, 4]), &[ord(0), ord(1)], 0, ord(3));
        assert_eq!(moves(&plan), vec![(2, 0), (3, 1)]);
        assert_eq!(plan.slot, ord(2));
    }

    #[test]
    fn scattered_block_moving_up() {
        // [0..4], drag {2,4} onto 1
        let plan = plan(&siblings(&[0, 1, 3]), &[ord(2), ord(4)], 0, ord(1));
        assert_eq!(moves(&plan), vec![(1, 3), (3, 4)]);
        assert_eq!(plan.slot, ord(1));
    }

    #[test]
    fn dropping_onto_itself_changes_nothing() {
        let plan = plan(&siblings(&[0, 1, 3, 4]), &[ord(2)], 0, ord(2));
        assert!(plan.shifts.is_empty());
        assert_eq!(plan.slot, ord(2));
    }

    #[test]
    fn unordered_siblings_are_left_alone() {
        let mut s = siblings(&[0, 1]);
        s.push(ScopeEntry { node: Term::blank("loose"), order: None });
        let plan = plan(&s, &[], 1, ord(0));
        assert_eq!(moves(&plan), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn mixed_relocation_and_insertion() {
        // [0..3], drag 3 onto 1 and add one new entity alongside
        let plan = plan(&siblings(&[0, 1, 2]), &[ord(3)], 1, ord(1));
        assert_eq!(moves(&plan), vec![(1, 3), (2, 4)]);
        assert_eq!(plan.slot, ord(1));
    }
}
