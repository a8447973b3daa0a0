// SPDX-License-Identifier: MIT

//! Wire-visible error kinds and codec failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error kinds that can appear in a [`crate::Response`]'s `error.kind`
/// field. A shutdown acknowledgement is deliberately absent here — it isn't
/// an error, so it rides in `result`, not `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    UnknownStep,
    DuplicateId,
    WouldCycle,
    InvalidTransition,
    QueueFull,
    InternalError,
}

/// The `error` object of a [`crate::Response`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireError {
    pub kind: ErrorKind,
    pub message: String,
}

impl WireError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

/// Failures in framing or (de)serializing a message, as distinct from
/// [`WireError`], which is an application-level error *carried inside* a
/// successfully framed response.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message length {len} exceeds max {max}")]
    MessageTooLarge { len: u32, max: u32 },
}
