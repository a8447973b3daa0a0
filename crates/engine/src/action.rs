// SPDX-License-Identifier: MIT

//! The user-supplied action function contract.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use autotrail_core::StepStatus;

use crate::interrupt::InterruptSignal;
use crate::queue::StepQueues;

/// Error surfaced when an action function panics or returns an error the
/// worker boundary must still turn into a completion rather than orphaning
/// the step's state.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ActionError(pub String);

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A step's executable behavior: `(context, input_queue, output_queue) ->
/// (status, return_value)`.
///
/// Mirrors the shape of an adapter trait rather than a bare closure so
/// actions can hold setup state (clients, handles) across invocations, and
/// so trait objects (`Arc<dyn StepAction<C>>`) can be stored in a dispatch
/// map keyed by step id. `interrupt` is the cooperative cancellation
/// signal — there is no forced preemption, so well-behaved actions poll it
/// at safe points and wind down early; the worker never tears the future
/// down on the caller's behalf.
#[async_trait]
pub trait StepAction<C: Send + Sync + 'static>: Send + Sync + 'static {
    async fn run(
        &self,
        context: Arc<C>,
        queues: &StepQueues,
        interrupt: &InterruptSignal,
    ) -> Result<(StepStatus, serde_json::Value), ActionError>;
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Adapts a plain async closure into a [`StepAction`], for callers who
/// don't need the full trait-object ceremony.
pub struct FnAction<F>(F);

impl<F> FnAction<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<C, F> StepAction<C> for FnAction<F>
where
    C: Send + Sync + 'static,
    F: for<'a> Fn(
            Arc<C>,
            &'a StepQueues,
            &'a InterruptSignal,
        ) -> BoxFuture<'a, Result<(StepStatus, serde_json::Value), ActionError>>
        + Send
        + Sync
        + 'static,
{
    async fn run(
        &self,
        context: Arc<C>,
        queues: &StepQueues,
        interrupt: &InterruptSignal,
    ) -> Result<(StepStatus, serde_json::Value), ActionError> {
        (self.0)(context, queues, interrupt).await
    }
}
