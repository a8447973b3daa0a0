// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use autotrail_core::{Step, StepStatus, Trail};
use autotrail_engine::{ActionError, InterruptSignal, StepQueues};
use tokio::time::sleep;

use super::*;
use crate::config::TrailServerConfig;

struct Never;

#[async_trait]
impl StepAction<()> for Never {
    async fn run(
        &self,
        _context: Arc<()>,
        _queues: &StepQueues,
        interrupt: &InterruptSignal,
    ) -> Result<(StepStatus, Value), ActionError> {
        interrupt.requested().await;
        Ok((StepStatus::Success, Value::Null))
    }
}

fn trail_with_one_step() -> Trail {
    Trail::builder().add_step(Step::new("a", "a")).unwrap().build().unwrap()
}

fn manager_with(action: Arc<dyn StepAction<()>>) -> TrailManager<()> {
    let mut actions: HashMap<StepId, Arc<dyn StepAction<()>>> = HashMap::new();
    actions.insert("a".into(), action);
    TrailManager::new(trail_with_one_step(), actions, Arc::new(()), TrailServerConfig::default()).unwrap()
}

#[test]
fn unknown_call_is_bad_request() {
    let table = build_dispatch_table::<()>();
    let mut mgr = manager_with(Arc::new(Never));
    let response = dispatch(&table, &mut mgr, Request::new("nonexistent", "r1", Value::Null));
    assert!(!response.ok);
    assert_eq!(response.error.unwrap().kind, ErrorKind::BadRequest);
}

#[test]
fn list_returns_every_step_without_a_payload() {
    let table = build_dispatch_table::<()>();
    let mut mgr = manager_with(Arc::new(Never));
    let response = dispatch(&table, &mut mgr, Request::new("list", "r1", Value::Null));
    assert!(response.ok);
    assert_eq!(response.result.unwrap().as_array().unwrap().len(), 1);
}

#[test]
fn list_filters_by_tags_when_given_a_predicate() {
    let trail = Trail::builder()
        .add_step(Step::new("a", "a").with_tag("env", "prod"))
        .unwrap()
        .add_step(Step::new("b", "b").with_tag("env", "staging"))
        .unwrap()
        .build()
        .unwrap();
    let mut actions: HashMap<StepId, Arc<dyn StepAction<()>>> = HashMap::new();
    actions.insert("a".into(), Arc::new(Never));
    actions.insert("b".into(), Arc::new(Never));
    let mut mgr =
        TrailManager::new(trail, actions, Arc::new(()), TrailServerConfig::default()).unwrap();

    let table = build_dispatch_table::<()>();
    let response = dispatch(
        &table,
        &mut mgr,
        Request::new("list", "r1", serde_json::json!({"tags": {"env": "prod"}})),
    );
    assert!(response.ok);
    let result = response.result.unwrap();
    let names: Vec<_> = result.as_array().unwrap().iter().map(|s| s["id"].clone()).collect();
    assert_eq!(names, vec![serde_json::json!("a")]);
}

#[test]
fn list_with_an_unmatched_tag_returns_an_empty_but_ok_list() {
    let table = build_dispatch_table::<()>();
    let mut mgr = manager_with(Arc::new(Never));
    let response = dispatch(
        &table,
        &mut mgr,
        Request::new("list", "r1", serde_json::json!({"tags": {"env": "nonexistent"}})),
    );
    assert!(response.ok);
    assert_eq!(response.result.unwrap().as_array().unwrap().len(), 0);
}

#[test]
fn pause_without_step_ids_is_bad_request() {
    let table = build_dispatch_table::<()>();
    let mut mgr = manager_with(Arc::new(Never));
    let response = dispatch(&table, &mut mgr, Request::new("pause", "r1", serde_json::json!({})));
    assert!(!response.ok);
    assert_eq!(response.error.unwrap().kind, ErrorKind::BadRequest);
}

#[test]
fn pause_sets_the_flag_and_reports_the_affected_step() {
    let table = build_dispatch_table::<()>();
    let mut mgr = manager_with(Arc::new(Never));
    let response = dispatch(
        &table,
        &mut mgr,
        Request::new("pause", "r1", serde_json::json!({"step_ids": ["a"]})),
    );
    assert!(response.ok);
    assert_eq!(response.result.unwrap()["affected"], serde_json::json!(["a"]));
    assert!(mgr.snapshot(&"a".into()).unwrap().flags.pause_requested);
}

#[test]
fn selecting_an_unknown_step_id_yields_an_empty_but_ok_affected_list() {
    let table = build_dispatch_table::<()>();
    let mut mgr = manager_with(Arc::new(Never));
    let response = dispatch(
        &table,
        &mut mgr,
        Request::new("pause", "r1", serde_json::json!({"step_ids": ["nonexistent"]})),
    );
    assert!(response.ok);
    assert_eq!(response.result.unwrap()["affected"], serde_json::json!([]));
}

#[tokio::test(flavor = "multi_thread")]
async fn send_message_then_get_step_messages_round_trips() {
    struct Echo;
    #[async_trait]
    impl StepAction<()> for Echo {
        async fn run(
            &self,
            _context: Arc<()>,
            queues: &StepQueues,
            _interrupt: &InterruptSignal,
        ) -> Result<(StepStatus, Value), ActionError> {
            let message = queues.to_step.try_pop();
            queues.from_step.push(serde_json::json!({"echo": message})).ok();
            Ok((StepStatus::Success, Value::Null))
        }
    }

    let table = build_dispatch_table::<()>();
    let mut mgr = manager_with(Arc::new(Echo));

    let response = dispatch(
        &table,
        &mut mgr,
        Request::new(
            "send_message_to_steps",
            "r1",
            serde_json::json!({"step_ids": ["a"], "message": "hi"}),
        ),
    );
    assert!(response.ok);

    for _ in 0..50 {
        mgr.tick();
        if mgr.is_drained() {
            break;
        }
        sleep(Duration::from_millis(5)).await;
    }

    let response = dispatch(
        &table,
        &mut mgr,
        Request::new("get_step_messages", "r2", serde_json::json!({"step_ids": ["a"]})),
    );
    assert!(response.ok);
    let result = response.result.unwrap();
    assert_eq!(result["a"], serde_json::json!([{"echo": "hi"}]));
}

#[test]
fn shutdown_sets_the_manager_shutdown_flag() {
    let table = build_dispatch_table::<()>();
    let mut mgr = manager_with(Arc::new(Never));
    let response = dispatch(&table, &mut mgr, Request::new("shutdown", "r1", Value::Null));
    assert!(response.ok);
    assert_eq!(response.result.unwrap()["shutdown_ack"], serde_json::json!(true));
    assert!(mgr.shutdown_requested());
}
