// SPDX-License-Identifier: MIT

//! The control-socket API dispatch table.
//!
//! An `APICallDefinition` is a configuration record, not a registration
//! side effect: every recognized call is built once into a static-keyed
//! map at startup, and `dispatch` is a pure lookup plus three function
//! calls (validate, select, apply).

use std::collections::HashMap;

use autotrail_core::StepId;
use autotrail_wire::{ErrorKind, Request, Response, WireError};
use serde_json::Value;

use crate::manager::TrailManager;

/// One registered API call: validate the payload, select the steps it
/// applies to, apply the effect, and shape the response.
pub struct APICallDefinition<C> {
    pub name: &'static str,
    pub validate: fn(&Value) -> Result<(), WireError>,
    pub select: fn(&TrailManager<C>, &Value) -> Vec<StepId>,
    pub apply: fn(&mut TrailManager<C>, &[StepId], &Value) -> Result<Value, WireError>,
}

/// Builds the fixed dispatch table once.
pub fn build_dispatch_table<C: Send + Sync + 'static>() -> HashMap<&'static str, APICallDefinition<C>> {
    let mut table = HashMap::new();
    for call in calls::<C>() {
        table.insert(call.name, call);
    }
    table
}

/// Run one [`Request`] through the dispatch table.
pub fn dispatch<C: Send + Sync + 'static>(
    table: &HashMap<&'static str, APICallDefinition<C>>,
    manager: &mut TrailManager<C>,
    request: Request,
) -> Response {
    let Request { name, request_id, payload } = request;
    match table.get(name.as_str()) {
        Some(call) => match (call.validate)(&payload) {
            Ok(()) => {
                let targets = (call.select)(manager, &payload);
                match (call.apply)(manager, &targets, &payload) {
                    Ok(result) => Response::ok(request_id, result),
                    Err(err) => Response::err(request_id, err.kind, err.message),
                }
            }
            Err(err) => Response::err(request_id, err.kind, err.message),
        },
        None => Response::err(request_id, ErrorKind::BadRequest, format!("unknown call `{name}`")),
    }
}

fn no_validation(_payload: &Value) -> Result<(), WireError> {
    Ok(())
}

/// `payload.step_ids: [string]` (required, non-empty) — the common shape
/// shared by `pause`/`resume`/`skip`/`unskip`/`block`/`unblock`/
/// `interrupt`/`rerun`/`get_step_messages`.
fn validate_step_ids(payload: &Value) -> Result<(), WireError> {
    match payload.get("step_ids").and_then(Value::as_array) {
        Some(ids) if ids.iter().all(Value::is_string) => Ok(()),
        _ => Err(WireError::new(ErrorKind::BadRequest, "expected payload.step_ids: [string]")),
    }
}

/// `payload.step_ids: [string]`, `payload.message: any` (required) — shape
/// for `send_message_to_steps`.
fn validate_send_message(payload: &Value) -> Result<(), WireError> {
    validate_step_ids(payload)?;
    if payload.get("message").is_none() {
        return Err(WireError::new(ErrorKind::BadRequest, "expected payload.message"));
    }
    Ok(())
}

/// Selects steps named explicitly in `payload.step_ids`. An id that isn't
/// in the trail is silently dropped from the selection rather than
/// rejected — an empty selection is never an error.
fn select_by_ids<C>(manager: &TrailManager<C>, payload: &Value) -> Vec<StepId> {
    payload
        .get("step_ids")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(StepId::from)
        .filter(|id| manager.contains_step(id))
        .collect()
}

/// Selects steps by an optional `payload.tags` predicate — used by `list`.
/// A step matches when its own `tags` map contains every key/value pair in
/// `payload.tags`. Absent, non-object, or empty `payload.tags` selects
/// every step in the trail (unfiltered `list`).
fn select_by_tags<C>(manager: &TrailManager<C>, payload: &Value) -> Vec<StepId> {
    let wanted = payload.get("tags").and_then(Value::as_object).filter(|m| !m.is_empty());
    manager
        .trail()
        .topological_order()
        .iter()
        .filter(|id| {
            let Some(wanted) = wanted else { return true };
            manager.trail().step(id).is_some_and(|step| {
                wanted.iter().all(|(k, v)| {
                    v.as_str().is_some_and(|v| step.tags.get(k).map(String::as_str) == Some(v))
                })
            })
        })
        .cloned()
        .collect()
}

fn select_none<C>(_manager: &TrailManager<C>, _payload: &Value) -> Vec<StepId> {
    Vec::new()
}

fn calls<C: Send + Sync + 'static>() -> Vec<APICallDefinition<C>> {
    vec![
        APICallDefinition {
            name: "list",
            validate: no_validation,
            select: select_by_tags,
            apply: |manager, targets, _payload| {
                let snapshots: Vec<_> = targets.iter().filter_map(|id| manager.snapshot(id)).collect();
                Ok(serde_json::to_value(snapshots).unwrap_or(Value::Null))
            },
        },
        APICallDefinition {
            name: "status",
            validate: validate_step_ids,
            select: select_by_ids,
            apply: |manager, targets, _payload| {
                let snapshots: Vec<_> = targets.iter().filter_map(|id| manager.snapshot(id)).collect();
                Ok(serde_json::to_value(snapshots).unwrap_or(Value::Null))
            },
        },
        APICallDefinition {
            name: "pause",
            validate: validate_step_ids,
            select: select_by_ids,
            apply: |manager, targets, _payload| Ok(apply_flag(manager, targets, |f| f.pause_requested = true)),
        },
        APICallDefinition {
            name: "resume",
            validate: validate_step_ids,
            select: select_by_ids,
            apply: |manager, targets, _payload| Ok(apply_flag(manager, targets, |f| f.pause_requested = false)),
        },
        APICallDefinition {
            name: "skip",
            validate: validate_step_ids,
            select: select_by_ids,
            apply: |manager, targets, _payload| Ok(apply_flag(manager, targets, |f| f.skip_requested = true)),
        },
        APICallDefinition {
            name: "unskip",
            validate: validate_step_ids,
            select: select_by_ids,
            apply: |manager, targets, _payload| Ok(apply_flag(manager, targets, |f| f.skip_requested = false)),
        },
        APICallDefinition {
            name: "block",
            validate: validate_step_ids,
            select: select_by_ids,
            apply: |manager, targets, _payload| Ok(apply_flag(manager, targets, |f| f.block_requested = true)),
        },
        APICallDefinition {
            name: "unblock",
            validate: validate_step_ids,
            select: select_by_ids,
            apply: |manager, targets, _payload| Ok(apply_flag(manager, targets, |f| f.block_requested = false)),
        },
        APICallDefinition {
            name: "interrupt",
            validate: validate_step_ids,
            select: select_by_ids,
            apply: |manager, targets, _payload| Ok(apply_flag(manager, targets, |f| f.interrupt_requested = true)),
        },
        APICallDefinition {
            name: "rerun",
            validate: validate_step_ids,
            select: select_by_ids,
            apply: |manager, targets, _payload| Ok(apply_flag(manager, targets, |f| f.rerun_requested = true)),
        },
        APICallDefinition {
            name: "send_message_to_steps",
            validate: validate_send_message,
            select: select_by_ids,
            apply: |manager, targets, payload| {
                let message = payload.get("message").cloned().unwrap_or(Value::Null);
                let mut affected = Vec::new();
                for id in targets {
                    match manager.send_message(id, message.clone()) {
                        Some(Ok(())) => affected.push(id.to_string()),
                        Some(Err(_)) => {
                            return Err(WireError::new(
                                ErrorKind::QueueFull,
                                format!("message queue full for step `{id}`"),
                            ));
                        }
                        None => {}
                    }
                }
                Ok(serde_json::json!({ "affected": affected }))
            },
        },
        APICallDefinition {
            name: "get_step_messages",
            validate: validate_step_ids,
            select: select_by_ids,
            apply: |manager, targets, _payload| {
                let mut messages = serde_json::Map::new();
                for id in targets {
                    if let Some(inbox) = manager.drain_inbox(id) {
                        messages.insert(id.to_string(), Value::Array(inbox));
                    }
                }
                Ok(Value::Object(messages))
            },
        },
        APICallDefinition {
            name: "shutdown",
            validate: no_validation,
            select: select_none,
            apply: |manager, _targets, _payload| {
                manager.request_shutdown();
                Ok(serde_json::json!({ "shutdown_ack": true }))
            },
        },
    ]
}

fn apply_flag<C: Send + Sync + 'static>(
    manager: &mut TrailManager<C>,
    targets: &[StepId],
    f: impl Fn(&mut autotrail_core::StepFlags),
) -> Value {
    let mut affected = Vec::new();
    for id in targets {
        if manager.update_flags(id, &f) {
            affected.push(id.to_string());
        }
    }
    serde_json::json!({ "affected": affected })
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
