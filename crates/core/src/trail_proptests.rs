// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use proptest::prelude::*;

use super::*;
use crate::proptest_support::small_dag;

proptest! {
    #[test]
    fn topological_order_respects_every_edge(trail in small_dag()) {
        let order = trail.topological_order();
        let position: HashMap<&StepId, usize> =
            order.iter().enumerate().map(|(i, id)| (id, i)).collect();
        for id in order {
            for succ in trail.successors(id) {
                prop_assert!(position[id] < position[succ]);
            }
        }
    }

    #[test]
    fn transitive_successors_never_contains_the_step_itself(trail in small_dag()) {
        for id in trail.topological_order() {
            prop_assert!(!trail.transitive_successors(id).contains(id));
        }
    }

    #[test]
    fn transitive_successors_is_closed_under_its_members_successors(trail in small_dag()) {
        for id in trail.topological_order() {
            let reached = trail.transitive_successors(id);
            for member in &reached {
                for grandchild in trail.successors(member) {
                    prop_assert!(reached.contains(grandchild));
                }
            }
        }
    }
}
