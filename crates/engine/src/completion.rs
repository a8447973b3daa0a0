// SPDX-License-Identifier: MIT

//! The record a worker reports back to the manager.

use autotrail_core::{StepId, StepStatus};

/// `(step_id, status, return_value)`, pushed onto the manager's single
/// completions channel when a step's action function finishes — whether it
/// returned normally, returned an error, or was interrupted.
#[derive(Debug, Clone)]
pub struct Completion {
    pub step_id: StepId,
    pub status: StepStatus,
    pub value: serde_json::Value,
}

impl Completion {
    pub fn new(step_id: StepId, status: StepStatus, value: serde_json::Value) -> Self {
        Self { step_id, status, value }
    }
}
