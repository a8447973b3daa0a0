// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use proptest::prelude::*;

use super::*;
use crate::proptest_support::small_dag;

proptest! {
    /// Topological safety: for every step `next_ready` ever offers, every
    /// predecessor must already be `Done`. The caller here
    /// reports `Ready` for everything not yet done, the way a real manager
    /// reports `Ready` the instant a step's own flags/state allow it,
    /// independent of predecessor completion -- it's the engine's job to
    /// withhold a step anyway until its predecessors catch up.
    #[test]
    fn next_ready_never_offers_a_step_before_its_predecessors_are_done(trail in small_dag()) {
        let total = trail.topological_order().len();
        let mut engine = TopoEngine::new(trail.clone());
        let mut done: HashSet<StepId> = HashSet::new();
        let mut iterations = 0;

        while done.len() < total {
            iterations += 1;
            prop_assert!(iterations <= total + 4, "engine failed to drain a {total}-step DAG");

            let readiness_fn = |id: &StepId| {
                if done.contains(id) { Readiness::Done } else { Readiness::Ready }
            };
            let ready = engine.next_ready(readiness_fn);
            for id in &ready {
                for pred in trail.predecessors(id) {
                    prop_assert!(
                        done.contains(pred),
                        "offered `{id}` before predecessor `{pred}` finished"
                    );
                }
            }
            for id in ready {
                done.insert(id);
            }
        }

        prop_assert!(engine.is_drained(|id| {
            if done.contains(id) { Readiness::Done } else { Readiness::Ready }
        }));
    }
}
