// SPDX-License-Identifier: MIT

//! The control-socket response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorKind, WireError};

/// `{ "request_id": <string>, "ok": <bool>, "result": <object> | null,
///    "error": { "kind": <string>, "message": <string> } | null }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub request_id: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

impl Response {
    pub fn ok(request_id: impl Into<String>, result: Value) -> Self {
        Self { request_id: request_id.into(), ok: true, result: Some(result), error: None }
    }

    pub fn err(request_id: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ok: false,
            result: None,
            error: Some(WireError::new(kind, message)),
        }
    }

    /// Sentinel success response for the `shutdown` call — not an error,
    /// so it carries a sentinel payload in `result` instead.
    pub fn shutdown_ack(request_id: impl Into<String>) -> Self {
        Self::ok(request_id, serde_json::json!({ "shutdown_ack": true }))
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
