// SPDX-License-Identifier: MIT

//! Per-step lifecycle state, flags, and outcome types.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a single step.
///
/// Transitions:
///
/// ```text
/// Wait  -> Ready  -> Run  -> {Success, Failure}
/// Wait  -> Skipped
/// Run   -> Paused -> Run
/// Run   -> Interrupted -> {Success, Failure}
/// Wait  -> Blocked -> Wait
/// {Success, Failure, Skipped} -> Wait    (rerun)
/// any   -> Unreachable
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Wait,
    Ready,
    Run,
    Paused,
    Blocked,
    Interrupted,
    Success,
    Failure,
    Skipped,
    Unreachable,
}

impl StepState {
    /// Initial state for every step.
    pub const INITIAL: StepState = StepState::Wait;

    /// `Success`, `Failure`, `Skipped`, `Unreachable` — states the drained
    /// engine considers finished and from which a rerun can be requested
    /// (except `Unreachable`, which is not rerunnable: it marks a step that
    /// never ran at all).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StepState::Success | StepState::Failure | StepState::Skipped | StepState::Unreachable
        )
    }

    /// States from which `rerun_requested` re-enters the trail at `Wait`.
    /// `Unreachable` is deliberately excluded — it marks a step that can
    /// never run because an ancestor failed, not a step that ran and
    /// finished.
    pub fn is_rerunnable(self) -> bool {
        matches!(self, StepState::Success | StepState::Failure | StepState::Skipped)
    }

    /// Does this state unblock successors? `Success` is the only state that
    /// does by itself; `Skipped` behaves the same way for this purpose.
    pub fn unblocks_successors(self) -> bool {
        matches!(self, StepState::Success | StepState::Skipped)
    }
}

crate::simple_display! {
    StepState {
        Wait => "wait",
        Ready => "ready",
        Run => "run",
        Paused => "paused",
        Blocked => "blocked",
        Interrupted => "interrupted",
        Success => "success",
        Failure => "failure",
        Skipped => "skipped",
        Unreachable => "unreachable",
    }
}

/// Status a worker reports for a completed action function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Failure,
}

crate::simple_display! {
    StepStatus {
        Success => "success",
        Failure => "failure",
    }
}

/// Operator-settable intents, consumed by the manager's state functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFlags {
    pub pause_requested: bool,
    pub skip_requested: bool,
    pub block_requested: bool,
    pub rerun_requested: bool,
    pub interrupt_requested: bool,
}

impl StepFlags {
    pub fn is_empty(&self) -> bool {
        !self.pause_requested
            && !self.skip_requested
            && !self.block_requested
            && !self.rerun_requested
            && !self.interrupt_requested
    }
}

/// Last `(status, return_value)` reported by a step's action function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub status: StepStatus,
    pub value: serde_json::Value,
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
