// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn defaults_match_spec() {
    let config = TrailServerConfig::default();
    assert_eq!(config.tick_interval_ms, 50);
    assert!(config.socket_path.is_none());
    assert!(config.max_parallel_workers.is_none());
    assert!(config.message_queue_cap.is_none());
}

#[test]
fn builder_overrides_only_what_is_set() {
    let config = TrailServerConfig::builder().tick_interval_ms(10).max_parallel_workers(Some(4)).build();

    assert_eq!(config.tick_interval_ms, 10);
    assert_eq!(config.max_parallel_workers, Some(4));
    assert!(config.message_queue_cap.is_none());
}

#[test]
fn resolve_socket_path_falls_back_to_temp_dir() {
    let config = TrailServerConfig::default();
    let run_id = autotrail_core::RunId::new();
    let path = config.resolve_socket_path(&run_id);
    assert!(path.starts_with(std::env::temp_dir()));
}

#[test]
fn resolve_socket_path_prefers_configured_path() {
    let config = TrailServerConfig::builder().socket_path("/tmp/custom.sock").build();
    let run_id = autotrail_core::RunId::new();
    assert_eq!(config.resolve_socket_path(&run_id), std::path::PathBuf::from("/tmp/custom.sock"));
}
