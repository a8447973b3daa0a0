// SPDX-License-Identifier: MIT

//! The topological engine: `topological_while`.
//!
//! This is the algorithmic heart of the trail execution engine. It
//! generalizes a one-shot topological walk into a re-evaluating producer
//! of runnable nodes that cooperates with an external mutator (the trail
//! manager in `autotrail-daemon`).

use std::collections::HashSet;

use crate::trail::{StepId, Trail};

/// Per-step readiness as reported by the caller-supplied `readiness_fn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The step's own preconditions (state, flags) allow it to run next,
    /// independent of its predecessors — the engine still checks those.
    Ready,
    /// Not currently eligible (e.g. still `Wait` with preconditions unmet,
    /// in flight as `Run`, `Paused`, or `Blocked`).
    NotReady,
    /// Finished in a way that unblocks successors (`Success` or `Skipped`).
    Done,
    /// Can never run; successors must never become ready through it.
    Unreachable,
}

/// A re-evaluating producer of runnable steps over a fixed [`Trail`].
///
/// The engine does not block waiting for steps, capture completions, or own
/// any step state itself (predecessors/successors come from the `Trail`;
/// everything else is re-derived from `readiness_fn` on every call). The
/// only state the engine keeps privately is which steps it has already
/// offered and not yet seen reported back as `Done`/`Unreachable` — this is
/// what prevents a step from being returned twice while it's still running,
/// while still allowing rerun (resetting a `Done` step back to `Ready`
/// makes it eligible again, since `Done` clears the "offered" marker).
pub struct TopoEngine {
    trail: Trail,
    offered: HashSet<StepId>,
}

impl TopoEngine {
    /// Takes ownership of `trail`. A validated [`Trail`] never mutates
    /// after `build()`, and the engine's `offered` bookkeeping must
    /// outlive any single tick, so the engine owns its copy rather than
    /// borrowing one the manager also holds.
    pub fn new(trail: Trail) -> Self {
        Self { trail, offered: HashSet::new() }
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Returns the set of steps that are newly runnable this call: every
    /// predecessor is `Done`, `readiness_fn(step) == Ready`, and the step
    /// has not already been returned and not yet marked `Done`. Iterates in
    /// the trail's topological order, so the returned `Vec` preserves
    /// insertion-order tie-breaking.
    pub fn next_ready(&mut self, mut readiness_fn: impl FnMut(&StepId) -> Readiness) -> Vec<StepId> {
        let mut result = Vec::new();
        for id in self.trail.topological_order() {
            match readiness_fn(id) {
                Readiness::Done | Readiness::Unreachable => {
                    // Terminal from the engine's point of view: clear the
                    // "offered" marker so a later rerun (Done -> Ready) is
                    // offered again instead of being silently swallowed.
                    self.offered.remove(id);
                }
                Readiness::NotReady => {}
                Readiness::Ready => {
                    if self.offered.contains(id) {
                        continue;
                    }
                    let predecessors_done = self
                        .trail
                        .predecessors(id)
                        .iter()
                        .all(|p| matches!(readiness_fn(p), Readiness::Done));
                    if predecessors_done {
                        self.offered.insert(id.clone());
                        result.push(id.clone());
                    }
                }
            }
        }
        result
    }

    /// The engine is drained when every step is `Done` or `Unreachable`
    /// (and, implicitly, no rerun is pending — a pending rerun means the
    /// caller has already moved that step's reported readiness away from
    /// `Done`, so this check would already return `false`).
    pub fn is_drained(&self, mut readiness_fn: impl FnMut(&StepId) -> Readiness) -> bool {
        self.trail
            .topological_order()
            .iter()
            .all(|id| matches!(readiness_fn(id), Readiness::Done | Readiness::Unreachable))
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "engine_proptests.rs"]
mod proptests;
