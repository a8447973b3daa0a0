// SPDX-License-Identifier: MIT

//! Fatal, process-level errors and their exit codes.

use thiserror::Error;

/// Errors that abort `TrailServer::start`/`run` rather than being isolated
/// per-connection or per-step — anything leaving the manager's invariants
/// inconsistent is fatal.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("trail validation failed: {0}")]
    Validation(#[from] autotrail_core::Error),

    #[error("socket bind failed: {0}")]
    SocketBind(std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DaemonError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            DaemonError::Validation(_) => 1,
            DaemonError::SocketBind(_) => 2,
            DaemonError::Internal(_) => 3,
        }
    }
}
