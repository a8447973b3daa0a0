// SPDX-License-Identifier: MIT

//! Server configuration (recognized options).

use std::path::PathBuf;
use std::time::Duration;

/// Recognized `TrailServer` options. Constructed via [`TrailServerConfig::builder`].
#[derive(Debug, Clone)]
pub struct TrailServerConfig {
    /// Filesystem path for the control socket. `None` means "pick a
    /// per-run temp path".
    pub socket_path: Option<PathBuf>,
    pub tick_interval_ms: u64,
    /// `None` means unbounded.
    pub max_parallel_workers: Option<usize>,
    /// `None` means unbounded.
    pub message_queue_cap: Option<usize>,
    /// How many ready connections `serve_socket` drains per tick.
    pub max_requests_per_tick: usize,
}

impl Default for TrailServerConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            tick_interval_ms: 50,
            max_parallel_workers: None,
            message_queue_cap: None,
            max_requests_per_tick: 32,
        }
    }
}

impl TrailServerConfig {
    pub fn builder() -> TrailServerConfigBuilder {
        let defaults = Self::default();
        TrailServerConfigBuilder {
            socket_path: defaults.socket_path,
            tick_interval_ms: defaults.tick_interval_ms,
            max_parallel_workers: defaults.max_parallel_workers,
            message_queue_cap: defaults.message_queue_cap,
            max_requests_per_tick: defaults.max_requests_per_tick,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Resolve the socket path, generating a per-run temp path when none
    /// was configured.
    pub fn resolve_socket_path(&self, run_id: &autotrail_core::RunId) -> PathBuf {
        self.socket_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(format!("autotrail-{run_id}.sock")))
    }
}

#[derive(Debug, Clone)]
pub struct TrailServerConfigBuilder {
    socket_path: Option<PathBuf>,
    tick_interval_ms: u64,
    max_parallel_workers: Option<usize>,
    message_queue_cap: Option<usize>,
    max_requests_per_tick: usize,
}

impl TrailServerConfigBuilder {
    autotrail_core::setters! {
        option {
            socket_path: PathBuf,
        }
        set {
            tick_interval_ms: u64,
            max_parallel_workers: Option<usize>,
            message_queue_cap: Option<usize>,
            max_requests_per_tick: usize,
        }
    }

    pub fn build(self) -> TrailServerConfig {
        TrailServerConfig {
            socket_path: self.socket_path,
            tick_interval_ms: self.tick_interval_ms,
            max_parallel_workers: self.max_parallel_workers,
            message_queue_cap: self.message_queue_cap,
            max_requests_per_tick: self.max_requests_per_tick,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
