// SPDX-License-Identifier: MIT

use std::sync::Arc;

use async_trait::async_trait;
use autotrail_core::{Step, StepStatus, Trail};
use autotrail_engine::{ActionError, InterruptSignal, StepQueues};

use super::*;

struct ImmediateSuccess;

#[async_trait]
impl StepAction<()> for ImmediateSuccess {
    async fn run(
        &self,
        _context: Arc<()>,
        _queues: &StepQueues,
        _interrupt: &InterruptSignal,
    ) -> Result<(StepStatus, serde_json::Value), ActionError> {
        Ok((StepStatus::Success, serde_json::json!({})))
    }
}

fn one_step_trail() -> Trail {
    Trail::builder().add_step(Step::new("a", "a")).unwrap().build().unwrap()
}

#[test]
fn construction_rejects_a_trail_with_a_missing_action() {
    let trail = one_step_trail();
    let actions: HashMap<StepId, Arc<dyn StepAction<()>>> = HashMap::new();
    let result = TrailServer::new(trail, actions, Arc::new(()), TrailServerConfig::default());
    assert!(result.is_err());
}

#[test]
fn two_servers_get_distinct_run_ids() {
    let mut actions_a: HashMap<StepId, Arc<dyn StepAction<()>>> = HashMap::new();
    actions_a.insert("a".into(), Arc::new(ImmediateSuccess));
    let mut actions_b: HashMap<StepId, Arc<dyn StepAction<()>>> = HashMap::new();
    actions_b.insert("a".into(), Arc::new(ImmediateSuccess));

    let server_a =
        TrailServer::new(one_step_trail(), actions_a, Arc::new(()), TrailServerConfig::default()).unwrap();
    let server_b =
        TrailServer::new(one_step_trail(), actions_b, Arc::new(()), TrailServerConfig::default()).unwrap();

    assert_ne!(server_a.run_id(), server_b.run_id());
}

#[tokio::test(flavor = "multi_thread")]
async fn start_drains_a_trivial_trail_and_exits_zero() {
    let mut actions: HashMap<StepId, Arc<dyn StepAction<()>>> = HashMap::new();
    actions.insert("a".into(), Arc::new(ImmediateSuccess));

    let dir = std::env::temp_dir().join(format!("autotrail-server-test-{}", std::process::id()));
    let config = TrailServerConfig::builder()
        .socket_path(dir)
        .tick_interval_ms(5)
        .build();

    let server = TrailServer::new(one_step_trail(), actions, Arc::new(()), config).unwrap();
    let exit_code = tokio::time::timeout(std::time::Duration::from_secs(5), server.start())
        .await
        .expect("server should finish once its only step completes");

    assert_eq!(exit_code, 0);
}
