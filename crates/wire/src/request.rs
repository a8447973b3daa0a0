// SPDX-License-Identifier: MIT

//! The control-socket request envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ "name": <string>, "request_id": <string>, "payload": <object> }`
///
/// `name` selects the `APICallDefinition` to dispatch; `payload` is handed
/// to that call's validator as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    pub name: String,
    pub request_id: String,
    #[serde(default)]
    pub payload: Value,
}

impl Request {
    pub fn new(name: impl Into<String>, request_id: impl Into<String>, payload: Value) -> Self {
        Self { name: name.into(), request_id: request_id.into(), payload }
    }
}
