// SPDX-License-Identifier: MIT

//! Cooperative cancellation signal for a running step.
//!
//! `interrupt_requested` is delivered to the action as a flag it may poll;
//! there is no forced preemption, so an action that never checks simply
//! runs to completion.

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct InterruptSignal(CancellationToken);

impl InterruptSignal {
    pub fn new() -> Self {
        Self(CancellationToken::new())
    }

    /// Called by the manager when `interrupt_requested` is set on this
    /// step's flags.
    pub fn request(&self) {
        self.0.cancel();
    }

    pub fn is_requested(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Resolves once `request()` has been called; useful for an action
    /// that wants to race its own work against interruption rather than
    /// poll in a loop.
    pub async fn requested(&self) {
        self.0.cancelled().await
    }
}
