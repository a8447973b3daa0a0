// SPDX-License-Identifier: MIT

//! DAG construction errors.

use crate::trail::StepId;
use thiserror::Error;

/// Errors raised while building or validating a [`crate::trail::Trail`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("duplicate step id: {0}")]
    DuplicateId(StepId),

    #[error("unknown step id: {0}")]
    UnknownStep(StepId),

    #[error("adding edge {pred} -> {succ} would create a cycle")]
    WouldCycle { pred: StepId, succ: StepId },
}
