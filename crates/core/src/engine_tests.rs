// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use super::*;
use crate::trail::{Step, Trail};

fn linear_trail() -> Trail {
    Trail::builder()
        .add_step(Step::new("a", "a"))
        .unwrap()
        .add_step(Step::new("b", "b"))
        .unwrap()
        .add_step(Step::new("c", "c"))
        .unwrap()
        .add_edge("a", "b")
        .unwrap()
        .add_edge("b", "c")
        .unwrap()
        .build()
        .unwrap()
}

fn diamond_trail() -> Trail {
    Trail::builder()
        .add_step(Step::new("a", "a"))
        .unwrap()
        .add_step(Step::new("b", "b"))
        .unwrap()
        .add_step(Step::new("c", "c"))
        .unwrap()
        .add_step(Step::new("d", "d"))
        .unwrap()
        .add_edge("a", "b")
        .unwrap()
        .add_edge("a", "c")
        .unwrap()
        .add_edge("b", "d")
        .unwrap()
        .add_edge("c", "d")
        .unwrap()
        .build()
        .unwrap()
}

/// A tiny in-memory mirror of step state, standing in for the manager, so
/// these tests can drive `next_ready` through a full lifecycle.
struct FakeManager {
    states: HashMap<StepId, Readiness>,
}

impl FakeManager {
    fn new(trail: &Trail, initial: Readiness) -> Self {
        Self { states: trail.steps().map(|s| (s.id.clone(), initial)).collect() }
    }

    fn set(&mut self, id: &str, r: Readiness) {
        self.states.insert(id.into(), r);
    }

    fn readiness_fn(&self) -> impl FnMut(&StepId) -> Readiness + '_ {
        move |id: &StepId| *self.states.get(id).unwrap_or(&Readiness::NotReady)
    }
}

#[test]
fn only_root_is_ready_when_nothing_started() {
    let trail = linear_trail();
    let mut engine = TopoEngine::new(trail.clone());
    let mut mgr = FakeManager::new(&trail, Readiness::NotReady);
    mgr.set("a", Readiness::Ready);

    let ready = engine.next_ready(mgr.readiness_fn());
    assert_eq!(ready, vec![StepId::from("a")]);
}

#[test]
fn successor_becomes_ready_only_after_predecessor_done() {
    let trail = linear_trail();
    let mut engine = TopoEngine::new(trail.clone());
    let mut mgr = FakeManager::new(&trail, Readiness::NotReady);
    mgr.set("a", Readiness::Ready);
    mgr.set("b", Readiness::Ready);

    // b is "ready" in isolation but a hasn't finished yet.
    let ready = engine.next_ready(mgr.readiness_fn());
    assert_eq!(ready, vec![StepId::from("a")]);

    mgr.set("a", Readiness::Done);
    let ready = engine.next_ready(mgr.readiness_fn());
    assert_eq!(ready, vec![StepId::from("b")]);
}

#[test]
fn a_step_is_not_offered_twice_while_still_running() {
    let trail = linear_trail();
    let mut engine = TopoEngine::new(trail.clone());
    let mut mgr = FakeManager::new(&trail, Readiness::NotReady);
    mgr.set("a", Readiness::Ready);

    let first = engine.next_ready(mgr.readiness_fn());
    assert_eq!(first, vec![StepId::from("a")]);

    // Still Ready from the caller's point of view (e.g. caller hasn't
    // transitioned state to Run yet) -- must not be re-offered.
    let second = engine.next_ready(mgr.readiness_fn());
    assert!(second.is_empty());
}

#[test]
fn diamond_offers_both_branches_once_root_done() {
    let trail = diamond_trail();
    let mut engine = TopoEngine::new(trail.clone());
    let mut mgr = FakeManager::new(&trail, Readiness::NotReady);
    mgr.set("a", Readiness::Ready);

    assert_eq!(engine.next_ready(mgr.readiness_fn()), vec![StepId::from("a")]);

    mgr.set("a", Readiness::Done);
    mgr.set("b", Readiness::Ready);
    mgr.set("c", Readiness::Ready);
    let ready = engine.next_ready(mgr.readiness_fn());
    assert_eq!(ready, vec![StepId::from("b"), StepId::from("c")]);
}

#[test]
fn d_waits_for_both_b_and_c() {
    let trail = diamond_trail();
    let mut engine = TopoEngine::new(trail.clone());
    let mut mgr = FakeManager::new(&trail, Readiness::NotReady);
    mgr.set("a", Readiness::Done);
    mgr.set("b", Readiness::Done);
    mgr.set("c", Readiness::Ready);
    mgr.set("d", Readiness::Ready);

    // c hasn't finished, so d must not be offered yet.
    let ready = engine.next_ready(mgr.readiness_fn());
    assert_eq!(ready, vec![StepId::from("c")]);

    mgr.set("c", Readiness::Done);
    let ready = engine.next_ready(mgr.readiness_fn());
    assert_eq!(ready, vec![StepId::from("d")]);
}

#[test]
fn rerun_after_done_is_offered_again() {
    let trail = linear_trail();
    let mut engine = TopoEngine::new(trail.clone());
    let mut mgr = FakeManager::new(&trail, Readiness::NotReady);
    mgr.set("a", Readiness::Ready);

    assert_eq!(engine.next_ready(mgr.readiness_fn()), vec![StepId::from("a")]);
    mgr.set("a", Readiness::Done);
    assert!(engine.next_ready(mgr.readiness_fn()).is_empty());

    // Rerun: manager resets a back to Ready.
    mgr.set("a", Readiness::Ready);
    assert_eq!(engine.next_ready(mgr.readiness_fn()), vec![StepId::from("a")]);
}

#[test]
fn unreachable_predecessor_never_unblocks_successor() {
    let trail = linear_trail();
    let mut engine = TopoEngine::new(trail.clone());
    let mut mgr = FakeManager::new(&trail, Readiness::NotReady);
    mgr.set("a", Readiness::Unreachable);
    mgr.set("b", Readiness::Ready);

    let ready = engine.next_ready(mgr.readiness_fn());
    assert!(ready.is_empty());
}

#[test]
fn is_drained_true_only_when_all_done_or_unreachable() {
    let trail = linear_trail();
    let engine = TopoEngine::new(trail.clone());
    let mut mgr = FakeManager::new(&trail, Readiness::Done);
    assert!(engine.is_drained(mgr.readiness_fn()));

    mgr.set("b", Readiness::NotReady);
    assert!(!engine.is_drained(mgr.readiness_fn()));

    mgr.set("b", Readiness::Unreachable);
    assert!(engine.is_drained(mgr.readiness_fn()));
}
