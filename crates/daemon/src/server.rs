// SPDX-License-Identifier: MIT

//! `TrailServer`: the process-level entry point.

use std::collections::HashMap;
use std::sync::Arc;

use autotrail_core::{RunId, StepId, Trail};
use autotrail_engine::StepAction;
use tracing::{error, info};

use crate::api::{build_dispatch_table, APICallDefinition};
use crate::config::TrailServerConfig;
use crate::error::DaemonError;
use crate::manager::TrailManager;
use crate::socket::{serve_socket, SocketGuard};

/// Owns the manager, the control socket, and the tick loop. `C` is the
/// opaque context type shared by every action.
pub struct TrailServer<C> {
    manager: TrailManager<C>,
    config: TrailServerConfig,
    table: HashMap<&'static str, APICallDefinition<C>>,
}

impl<C: Send + Sync + 'static> TrailServer<C> {
    /// Validates `trail` was already built (a [`Trail`] can only exist in
    /// validated form) and that every step has a matching action, then
    /// constructs the manager.
    pub fn new(
        trail: Trail,
        actions: HashMap<StepId, Arc<dyn StepAction<C>>>,
        context: Arc<C>,
        config: TrailServerConfig,
    ) -> Result<Self, DaemonError> {
        let manager = TrailManager::new(trail, actions, context, config.clone())?;
        Ok(Self { manager, config, table: build_dispatch_table() })
    }

    pub fn run_id(&self) -> &RunId {
        self.manager.run_id()
    }

    /// Bind the control socket and run the tick loop until shutdown or a
    /// fatal error. Returns the process exit code.
    pub async fn start(mut self) -> i32 {
        let socket_path = self.config.resolve_socket_path(self.manager.run_id());
        let (listener, _guard) = match SocketGuard::bind(&socket_path) {
            Ok(bound) => bound,
            Err(err) => {
                error!(path = %socket_path.display(), error = %err, "failed to bind control socket");
                return DaemonError::SocketBind(err).exit_code();
            }
        };
        info!(run_id = %self.manager.run_id(), path = %socket_path.display(), "control socket bound");

        let mut interval = tokio::time::interval(self.config.tick_interval());
        loop {
            interval.tick().await;

            serve_socket(&listener, self.config.max_requests_per_tick, &self.table, &mut self.manager).await;
            self.manager.tick();

            if self.manager.shutdown_requested() {
                self.manager.interrupt_all_running();
                if !self.manager.workers_in_flight() {
                    info!(run_id = %self.manager.run_id(), "shutdown drained, exiting");
                    return 0;
                }
                continue;
            }
            if self.manager.is_drained() {
                info!(run_id = %self.manager.run_id(), "trail drained, shutting down");
                return 0;
            }
        }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
