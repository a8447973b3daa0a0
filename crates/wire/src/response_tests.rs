// SPDX-License-Identifier: MIT

use super::*;
use crate::error::ErrorKind;

#[test]
fn ok_response_has_no_error() {
    let resp = Response::ok("r1", serde_json::json!({"steps": []}));
    assert!(resp.ok);
    assert!(resp.error.is_none());
    assert!(resp.result.is_some());
}

#[test]
fn err_response_has_no_result() {
    let resp = Response::err("r1", ErrorKind::UnknownStep, "no such step: ghost");
    assert!(!resp.ok);
    assert!(resp.result.is_none());
    assert_eq!(resp.error.unwrap().kind, ErrorKind::UnknownStep);
}

#[test]
fn shutdown_ack_is_a_success_not_an_error() {
    let resp = Response::shutdown_ack("r1");
    assert!(resp.ok);
    assert!(resp.error.is_none());
}

#[test]
fn null_fields_omitted_from_serialized_json() {
    let resp = Response::err("r1", ErrorKind::BadRequest, "bad");
    let json = serde_json::to_value(&resp).unwrap();
    assert!(json.get("result").is_none());
}
