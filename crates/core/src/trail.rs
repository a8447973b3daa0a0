// SPDX-License-Identifier: MIT

//! DAG primitives: steps, edges, and the validated [`Trail`] graph.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::Error;

/// A step identifier, supplied by the caller (unlike [`crate::RunId`], which
/// is process-generated) — e.g. `"fetch"`, `"build"`, `"deploy"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(SmolStr);

impl StepId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        StepId(SmolStr::new(s))
    }
}

impl From<String> for StepId {
    fn from(s: String) -> Self {
        StepId(SmolStr::new(s))
    }
}

impl std::borrow::Borrow<str> for StepId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

/// Immutable identity of a step: id, human name, and a free-form tag map
/// used by API selectors. The action function itself and
/// the mutable state record live one layer up, in `autotrail-engine` /
/// `autotrail-daemon`, which is why `Step` here carries no callable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub name: String,
    pub tags: HashMap<String, String>,
}

impl Step {
    pub fn new(id: impl Into<StepId>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), tags: HashMap::new() }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// A validated DAG of steps with edges meaning "must complete before".
/// Constructed only via [`TrailBuilder::build`], which
/// rejects cycles eagerly (Kahn's algorithm) so an invalid graph can never
/// reach the manager.
#[derive(Debug, Clone)]
pub struct Trail {
    steps: HashMap<StepId, Step>,
    /// Insertion order, preserved for deterministic tie-breaking.
    order: Vec<StepId>,
    predecessors: HashMap<StepId, Vec<StepId>>,
    successors: HashMap<StepId, Vec<StepId>>,
}

impl Trail {
    pub fn builder() -> TrailBuilder {
        TrailBuilder::default()
    }

    pub fn step(&self, id: &StepId) -> Option<&Step> {
        self.steps.get(id)
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.order.iter().map(move |id| &self.steps[id])
    }

    pub fn contains(&self, id: &StepId) -> bool {
        self.steps.contains_key(id)
    }

    pub fn predecessors(&self, id: &StepId) -> &[StepId] {
        self.predecessors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn successors(&self, id: &StepId) -> &[StepId] {
        self.successors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Any valid linearization, ties broken by insertion order.
    pub fn topological_order(&self) -> &[StepId] {
        &self.order
    }

    /// All steps transitively reachable as successors of `id`, including
    /// `id`'s direct successors but not `id` itself. Used by the manager to
    /// propagate `Unreachable` from a failed step to everything downstream
    /// of it.
    pub fn transitive_successors(&self, id: &StepId) -> HashSet<StepId> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<StepId> = self.successors(id).iter().cloned().collect();
        while let Some(next) = queue.pop_front() {
            if seen.insert(next.clone()) {
                for succ in self.successors(&next) {
                    queue.push_back(succ.clone());
                }
            }
        }
        seen
    }
}

/// Builder for [`Trail`]; accumulates steps and edges, then validates once
/// at `build()`.
#[derive(Debug, Default)]
pub struct TrailBuilder {
    steps: HashMap<StepId, Step>,
    order: Vec<StepId>,
    edges: Vec<(StepId, StepId)>,
}

impl TrailBuilder {
    pub fn add_step(mut self, step: Step) -> Result<Self, Error> {
        if self.steps.contains_key(&step.id) {
            return Err(Error::DuplicateId(step.id));
        }
        self.order.push(step.id.clone());
        self.steps.insert(step.id.clone(), step);
        Ok(self)
    }

    /// `pred` must complete before `succ` may become ready.
    pub fn add_edge(
        mut self,
        pred: impl Into<StepId>,
        succ: impl Into<StepId>,
    ) -> Result<Self, Error> {
        let pred = pred.into();
        let succ = succ.into();
        if !self.steps.contains_key(&pred) {
            return Err(Error::UnknownStep(pred));
        }
        if !self.steps.contains_key(&succ) {
            return Err(Error::UnknownStep(succ));
        }
        // Cheap local check: a self-edge is always a cycle. The full cycle
        // check runs once, eagerly, in `build()`.
        if pred == succ {
            return Err(Error::WouldCycle { pred, succ });
        }
        self.edges.push((pred, succ));
        Ok(self)
    }

    /// Validate the accumulated graph (Kahn's algorithm) and produce a
    /// [`Trail`]. Cycles are rejected here, eagerly — a trail becomes
    /// runnable only after it passes this validation.
    pub fn build(self) -> Result<Trail, Error> {
        let mut predecessors: HashMap<StepId, Vec<StepId>> = HashMap::new();
        let mut successors: HashMap<StepId, Vec<StepId>> = HashMap::new();
        for id in &self.order {
            predecessors.entry(id.clone()).or_default();
            successors.entry(id.clone()).or_default();
        }
        for (pred, succ) in &self.edges {
            successors.entry(pred.clone()).or_default().push(succ.clone());
            predecessors.entry(succ.clone()).or_default().push(pred.clone());
        }

        // Kahn's algorithm: repeatedly remove zero-in-degree nodes, breaking
        // ties by original insertion order so `topological_order()` is
        // deterministic.
        let mut in_degree: HashMap<StepId, usize> =
            self.order.iter().map(|id| (id.clone(), predecessors[id].len())).collect();
        let mut resolved: HashSet<StepId> = HashSet::new();
        let mut linearized = Vec::with_capacity(self.order.len());
        while linearized.len() < self.order.len() {
            let ready: Vec<StepId> = self
                .order
                .iter()
                .filter(|id| !resolved.contains(*id) && in_degree[*id] == 0)
                .cloned()
                .collect();
            if ready.is_empty() {
                // No zero-in-degree node remains: a cycle exists among the
                // unresolved steps. Report the first unresolved step as
                // `succ` and one of its still-unresolved predecessors as
                // `pred`, reading straight off `self.order`/`predecessors`
                // rather than searching `self.edges` for a match.
                let succ = self
                    .order
                    .iter()
                    .find(|id| !resolved.contains(*id))
                    .cloned()
                    .unwrap_or_else(|| self.order[0].clone());
                let pred = predecessors[&succ]
                    .iter()
                    .find(|p| !resolved.contains(*p))
                    .cloned()
                    .unwrap_or_else(|| succ.clone());
                return Err(Error::WouldCycle { pred, succ });
            }
            for id in ready {
                resolved.insert(id.clone());
                linearized.push(id.clone());
                for succ in &successors[&id] {
                    if let Some(count) = in_degree.get_mut(succ) {
                        *count -= 1;
                    }
                }
            }
        }

        Ok(Trail { steps: self.steps, order: linearized, predecessors, successors })
    }
}

#[cfg(test)]
#[path = "trail_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "trail_proptests.rs"]
mod proptests;
