// SPDX-License-Identifier: MIT

//! The control socket.
//!
//! Adapted from a background-task-per-connection accept loop to the
//! single-threaded cooperative model the manager requires: each tick polls
//! the listener with a zero timeout, drains up to `max_requests_per_tick`
//! ready connections inline, and returns without ever blocking the manager.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use autotrail_wire::{read_request, write_response};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, warn};

use crate::api::{dispatch, APICallDefinition};
use crate::manager::TrailManager;

/// Owns the control socket's path and removes the file on drop, so the
/// socket is cleaned up on every exit path — normal shutdown, a fatal
/// error, or a panic unwinding through `server.rs`.
pub struct SocketGuard {
    path: PathBuf,
}

impl SocketGuard {
    /// Binds a new listener at `path`, removing any stale socket file left
    /// behind by a previous crashed run first.
    pub fn bind(path: impl Into<PathBuf>) -> std::io::Result<(UnixListener, Self)> {
        let path = path.into();
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path)?;
        Ok((listener, Self { path }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SocketGuard {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %err, "failed to remove control socket");
            }
        }
    }
}

/// Drain up to `max_requests_per_tick` ready connections, non-blocking. A
/// connection that fails mid-read/write is dropped and logged; it never
/// reaches the manager as an error — socket errors are isolated
/// per-connection.
pub async fn serve_socket<C: Send + Sync + 'static>(
    listener: &UnixListener,
    max_requests_per_tick: usize,
    table: &HashMap<&'static str, APICallDefinition<C>>,
    manager: &mut TrailManager<C>,
) {
    for _ in 0..max_requests_per_tick {
        let stream = match tokio::time::timeout(Duration::ZERO, listener.accept()).await {
            Ok(Ok((stream, _addr))) => stream,
            Ok(Err(err)) => {
                warn!(error = %err, "control socket accept error");
                continue;
            }
            Err(_) => break, // no connection pending right now
        };
        if let Err(err) = handle_connection(stream, table, manager).await {
            debug!(error = %err, "control socket connection dropped");
        }
    }
}

async fn handle_connection<C: Send + Sync + 'static>(
    mut stream: UnixStream,
    table: &HashMap<&'static str, APICallDefinition<C>>,
    manager: &mut TrailManager<C>,
) -> Result<(), autotrail_wire::ProtocolError> {
    let request = read_request(&mut stream).await?;
    let response = dispatch(table, manager, request);
    write_response(&mut stream, &response).await
}
