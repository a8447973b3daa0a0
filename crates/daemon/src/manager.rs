// SPDX-License-Identifier: MIT

//! The trail manager: owns all step state and drives it forward one tick at
//! a time.
//!
//! The manager itself never awaits anything — `tick()` is a plain
//! synchronous function invoked from the async server loop in `server.rs`
//! at `tick_interval_ms` cadence. The manager never blocks except for that
//! bounded tick-sleep, which the caller owns.

use std::collections::HashMap;
use std::sync::Arc;

use autotrail_core::{
    Readiness, RunId, Step, StepFlags, StepId, StepResult, StepState, StepStatus, TopoEngine,
    Trail,
};
use autotrail_engine::{Completion, InterruptSignal, QueueError, StepAction, StepQueues, spawn_worker};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::TrailServerConfig;
use crate::error::DaemonError;

/// Everything the manager tracks for one step beyond its immutable
/// [`Step`] identity.
pub struct StepRecord<C> {
    pub step: Step,
    pub state: StepState,
    pub flags: StepFlags,
    pub result: Option<StepResult>,
    pub queues: Arc<StepQueues>,
    pub interrupt: InterruptSignal,
    pub action: Arc<dyn StepAction<C>>,
    /// Payloads drained from `from_step` across ticks, awaiting
    /// `get_step_messages`.
    pub inbox: Vec<Value>,
}

/// A read-only view of one step's state, returned by `list`/`status`.
#[derive(Debug, Clone, Serialize)]
pub struct StepSnapshot {
    pub id: StepId,
    pub name: String,
    pub state: StepState,
    pub flags: StepFlags,
    pub result: Option<StepResult>,
    pub tags: HashMap<String, String>,
}

/// The single-threaded event loop's state. Generic over the opaque context
/// type `C` shared by every action.
pub struct TrailManager<C> {
    run_id: RunId,
    engine: TopoEngine,
    records: HashMap<StepId, StepRecord<C>>,
    workers: HashMap<StepId, JoinHandle<()>>,
    context: Arc<C>,
    config: TrailServerConfig,
    completions_tx: mpsc::Sender<Completion>,
    completions_rx: mpsc::Receiver<Completion>,
    shutdown: bool,
}

impl<C: Send + Sync + 'static> TrailManager<C> {
    /// `actions` must supply exactly one [`StepAction`] per step in `trail`
    /// — a missing entry is a construction-time `DaemonError`, not a
    /// runtime one, since a trail with unrunnable steps should never reach
    /// `tick()`.
    pub fn new(
        trail: Trail,
        mut actions: HashMap<StepId, Arc<dyn StepAction<C>>>,
        context: Arc<C>,
        config: TrailServerConfig,
    ) -> Result<Self, DaemonError> {
        let (completions_tx, completions_rx) = mpsc::channel(1024);
        let mut records = HashMap::new();
        for step in trail.steps() {
            let action = actions.remove(&step.id).ok_or_else(|| {
                DaemonError::Internal(format!("no action supplied for step `{}`", step.id))
            })?;
            records.insert(
                step.id.clone(),
                StepRecord {
                    step: step.clone(),
                    state: StepState::INITIAL,
                    flags: StepFlags::default(),
                    result: None,
                    queues: Arc::new(StepQueues::new(config.message_queue_cap)),
                    interrupt: InterruptSignal::new(),
                    action,
                    inbox: Vec::new(),
                },
            );
        }
        Ok(Self {
            run_id: RunId::new(),
            engine: TopoEngine::new(trail),
            records,
            workers: HashMap::new(),
            context,
            config,
            completions_tx,
            completions_rx,
            shutdown: false,
        })
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn trail(&self) -> &Trail {
        self.engine.trail()
    }

    /// Drain completions, drain step messages, advance state, dispatch new
    /// work. Socket serving and the termination check are the caller's
    /// concern, since they need access to the socket listener / shutdown
    /// loop.
    pub fn tick(&mut self) {
        self.drain_completions();
        self.drain_step_messages();
        self.advance_states();
        self.dispatch_ready();
    }

    fn drain_completions(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply_completion(completion);
        }
    }

    fn apply_completion(&mut self, completion: Completion) {
        let Completion { step_id, status, value } = completion;
        self.workers.remove(&step_id);
        match self.records.get_mut(&step_id) {
            Some(record) => {
                let next = match status {
                    StepStatus::Success => StepState::Success,
                    StepStatus::Failure => StepState::Failure,
                };
                info!(run_id = %self.run_id, step = %step_id, from = %record.state, to = %next, "step completed");
                record.state = next;
                record.result = Some(StepResult { status, value });
            }
            None => warn!(run_id = %self.run_id, step = %step_id, "completion for unknown step"),
        }
        if status == StepStatus::Failure {
            self.propagate_unreachable(&step_id);
        }
    }

    /// A failed step's transitive successors can never run. Steps already
    /// terminal are left alone — marking an already-`Success` step
    /// `Unreachable` after the fact would be wrong.
    fn propagate_unreachable(&mut self, id: &StepId) {
        let successors = self.trail().transitive_successors(id);
        for succ in successors {
            if let Some(record) = self.records.get_mut(&succ) {
                if !record.state.is_terminal() {
                    info!(run_id = %self.run_id, step = %succ, "marked unreachable");
                    record.state = StepState::Unreachable;
                }
            }
        }
    }

    fn drain_step_messages(&mut self) {
        for record in self.records.values_mut() {
            let drained = record.queues.from_step.drain();
            if !drained.is_empty() {
                record.inbox.extend(drained);
            }
        }
    }

    /// The eight-line precedence table, applied per step in topological
    /// order. Combinations this table doesn't name (e.g. a `Wait` step with
    /// no flags and unmet predecessors) fall through to no transition at
    /// all — an implicit no-op, not a second enumerated table, since the
    /// eight rules already cover every state that can usefully change.
    fn advance_states(&mut self) {
        let ids: Vec<StepId> = self.trail().topological_order().to_vec();
        for id in ids {
            self.advance_one(&id);
        }
    }

    fn predecessors_done(&self, id: &StepId) -> bool {
        self.trail()
            .predecessors(id)
            .iter()
            .all(|p| self.records.get(p).map(|r| r.state.unblocks_successors()).unwrap_or(false))
    }

    fn advance_one(&mut self, id: &StepId) {
        let predecessors_done = self.predecessors_done(id);
        let Some(record) = self.records.get_mut(id) else { return };
        let state = record.state;
        let flags = record.flags;

        let next = if flags.interrupt_requested && state == StepState::Run {
            Some(StepState::Interrupted)
        } else if flags.skip_requested
            && matches!(state, StepState::Wait | StepState::Ready | StepState::Paused | StepState::Blocked)
        {
            Some(StepState::Skipped)
        } else if flags.block_requested && matches!(state, StepState::Wait | StepState::Ready) {
            Some(StepState::Blocked)
        } else if flags.pause_requested && state == StepState::Run {
            Some(StepState::Paused)
        } else if flags.rerun_requested && state.is_rerunnable() {
            Some(StepState::Wait)
        } else if predecessors_done && state == StepState::Wait {
            Some(StepState::Ready)
        } else if state == StepState::Paused && !flags.pause_requested {
            Some(StepState::Run)
        } else if state == StepState::Blocked && !flags.block_requested {
            Some(StepState::Wait)
        } else {
            None
        };

        if let Some(next) = next {
            if next == StepState::Interrupted {
                // One-shot trigger, not a persistent intent like pause/block
                // -- clear it so a later rerun doesn't immediately
                // re-interrupt the fresh attempt.
                record.interrupt.request();
                record.flags.interrupt_requested = false;
            }
            if next == StepState::Wait && state.is_rerunnable() {
                record.result = None;
                record.flags.rerun_requested = false;
            }
            debug!(run_id = %self.run_id, step = %id, from = %state, to = %next, "state transition");
            record.state = next;
        }
    }

    fn readiness_snapshot(&self) -> HashMap<StepId, Readiness> {
        self.records.iter().map(|(id, r)| (id.clone(), readiness_of(r.state))).collect()
    }

    /// Once shutdown is requested, in-flight workers still get drained but
    /// no newly-ready step is allowed to start — a running step finishes
    /// (or reports cooperatively interrupted) and the manager exits, rather
    /// than fresh work beginning after the request.
    fn dispatch_ready(&mut self) {
        if self.shutdown {
            return;
        }
        let snapshot = self.readiness_snapshot();
        let ready = self.engine.next_ready(|id| snapshot.get(id).copied().unwrap_or(Readiness::NotReady));
        for id in ready {
            if let Some(max) = self.config.max_parallel_workers {
                if self.workers.len() >= max {
                    break;
                }
            }
            self.start_worker(id);
        }
    }

    fn start_worker(&mut self, id: StepId) {
        let Some(record) = self.records.get_mut(&id) else { return };
        record.state = StepState::Run;
        // Fresh per run so a rerun's interrupt doesn't carry over a stale
        // cancellation from a previous attempt.
        record.interrupt = InterruptSignal::new();
        let handle = spawn_worker(
            id.clone(),
            record.action.clone(),
            self.context.clone(),
            record.queues.clone(),
            record.interrupt.clone(),
            self.completions_tx.clone(),
        );
        self.workers.insert(id, handle);
    }

    /// True once the engine is drained and no worker is still in flight.
    /// The shutdown-flag half of the termination check is the caller's
    /// concern, not this one's.
    pub fn is_drained(&self) -> bool {
        let snapshot = self.readiness_snapshot();
        self.workers.is_empty()
            && self.engine.is_drained(|id| snapshot.get(id).copied().unwrap_or(Readiness::NotReady))
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown
    }

    pub fn request_shutdown(&mut self) {
        self.shutdown = true;
    }

    /// True once every worker spawned before the shutdown request has
    /// reported its completion. Distinct from `is_drained`, which also
    /// requires the engine to consider the whole trail finished — during a
    /// shutdown drain, steps that never got a chance to run stay `Wait`
    /// forever, so `is_drained` would never return true.
    pub fn workers_in_flight(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Best-effort interrupt of every in-flight step, used when tearing
    /// down after a fatal error or a `shutdown` call.
    pub fn interrupt_all_running(&self) {
        for record in self.records.values() {
            if matches!(record.state, StepState::Run | StepState::Paused | StepState::Interrupted) {
                record.interrupt.request();
            }
        }
    }

    pub fn snapshot(&self, id: &StepId) -> Option<StepSnapshot> {
        self.records.get(id).map(|r| StepSnapshot {
            id: r.step.id.clone(),
            name: r.step.name.clone(),
            state: r.state,
            flags: r.flags,
            result: r.result.clone(),
            tags: r.step.tags.clone(),
        })
    }

    pub fn snapshots(&self) -> Vec<StepSnapshot> {
        self.trail().topological_order().iter().filter_map(|id| self.snapshot(id)).collect()
    }

    /// Mutate one step's flags in place; `false` if `id` is unknown.
    pub fn update_flags(&mut self, id: &StepId, f: impl FnOnce(&mut StepFlags)) -> bool {
        match self.records.get_mut(id) {
            Some(record) => {
                f(&mut record.flags);
                true
            }
            None => false,
        }
    }

    /// Push a payload onto a step's `to_step` queue. `None` if `id` is
    /// unknown; `Some(Err(QueueFull))` if the step's queue cap is reached.
    pub fn send_message(&self, id: &StepId, payload: Value) -> Option<Result<(), QueueError>> {
        self.records.get(id).map(|r| r.queues.to_step.push(payload))
    }

    /// Drain and return a step's accumulated `from_step` inbox.
    pub fn drain_inbox(&mut self, id: &StepId) -> Option<Vec<Value>> {
        self.records.get_mut(id).map(|r| std::mem::take(&mut r.inbox))
    }

    pub fn contains_step(&self, id: &StepId) -> bool {
        self.records.contains_key(id)
    }
}

fn readiness_of(state: StepState) -> Readiness {
    match state {
        StepState::Ready => Readiness::Ready,
        StepState::Success | StepState::Skipped => Readiness::Done,
        StepState::Failure | StepState::Unreachable => Readiness::Unreachable,
        StepState::Wait | StepState::Run | StepState::Paused | StepState::Blocked | StepState::Interrupted => {
            Readiness::NotReady
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
