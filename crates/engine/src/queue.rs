// SPDX-License-Identifier: MIT

//! Per-step message queues.
//!
//! `to_step` carries payloads from `send_message_to_steps` down to the
//! action; `from_step` carries payloads the action emits back up to
//! `get_step_messages`. Both are SPSC from the manager's and worker's
//! perspective — the manager is the only pusher to `to_step` and the only
//! drainer of `from_step` — so a plain mutex-guarded deque is sufficient;
//! there is never contention beyond enqueue/dequeue granularity.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("message queue full (cap {cap})")]
    Full { cap: usize },
}

/// A single bounded-or-unbounded FIFO of JSON payloads.
#[derive(Debug)]
pub struct MessageQueue {
    inner: Mutex<VecDeque<Value>>,
    cap: Option<usize>,
}

impl MessageQueue {
    pub fn new(cap: Option<usize>) -> Self {
        Self { inner: Mutex::new(VecDeque::new()), cap }
    }

    /// Enqueue `payload`. Fails with `QueueFull` if a cap is configured and
    /// already reached.
    pub fn push(&self, payload: Value) -> Result<(), QueueError> {
        let mut guard = self.inner.lock();
        if let Some(cap) = self.cap {
            if guard.len() >= cap {
                return Err(QueueError::Full { cap });
            }
        }
        guard.push_back(payload);
        Ok(())
    }

    /// Non-blocking pop of the oldest payload, if any.
    pub fn try_pop(&self) -> Option<Value> {
        self.inner.lock().pop_front()
    }

    /// Drain all currently queued payloads, oldest first.
    pub fn drain(&self) -> Vec<Value> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// The pair of message queues bridging the manager and a single step's
/// action function for the duration of one run.
#[derive(Debug)]
pub struct StepQueues {
    pub to_step: MessageQueue,
    pub from_step: MessageQueue,
}

impl StepQueues {
    pub fn new(cap: Option<usize>) -> Self {
        Self { to_step: MessageQueue::new(cap), from_step: MessageQueue::new(cap) }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
