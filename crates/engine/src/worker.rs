// SPDX-License-Identifier: MIT

//! Spawning one task per in-flight step.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use autotrail_core::{StepId, StepStatus};
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::action::{ActionError, StepAction};
use crate::completion::Completion;
use crate::interrupt::InterruptSignal;
use crate::queue::StepQueues;

/// Run `action` to completion on its own task and push a [`Completion`]
/// onto `completions_tx` regardless of how it finished — success, a
/// returned `ActionError`, or a panic — so the worker always completes
/// rather than orphaning state. A panic inside `action.run` is caught with
/// `catch_unwind` rather than left to unwind the task, since an orphaned
/// task would leave its step stuck in `Run` forever and the manager's
/// shutdown drain would never observe it finishing.
pub fn spawn_worker<C>(
    step_id: StepId,
    action: Arc<dyn StepAction<C>>,
    context: Arc<C>,
    queues: Arc<StepQueues>,
    interrupt: InterruptSignal,
    completions_tx: mpsc::Sender<Completion>,
) -> JoinHandle<()>
where
    C: Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(step = %step_id, "worker started");
        let outcome = AssertUnwindSafe(action.run(context, &queues, &interrupt)).catch_unwind().await;

        let completion = match outcome {
            Ok(Ok((status, value))) => Completion::new(step_id.clone(), status, value),
            Ok(Err(ActionError(message))) => {
                warn!(step = %step_id, error = %message, "action returned an error");
                Completion::new(step_id.clone(), StepStatus::Failure, serde_json::json!({ "error": message }))
            }
            Err(panic) => {
                let message = panic_message(&panic);
                error!(step = %step_id, error = %message, "action panicked");
                Completion::new(step_id.clone(), StepStatus::Failure, serde_json::json!({ "error": message }))
            }
        };

        if completions_tx.send(completion).await.is_err() {
            warn!(step = %step_id, "completions channel closed before worker could report");
        }
    })
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "action panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
