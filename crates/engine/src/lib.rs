// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! autotrail-engine: the step runner.
//!
//! Owns nothing but the worker pool's plumbing: spawning one task per
//! in-flight step, bridging its message queues, and reporting completions
//! back to the manager over a single channel. State ownership (`state`,
//! `result`, `flags`) stays with the manager in `autotrail-daemon`.

pub mod action;
pub mod completion;
pub mod interrupt;
pub mod queue;
pub mod worker;

pub use action::{ActionError, FnAction, StepAction};
pub use completion::Completion;
pub use interrupt::InterruptSignal;
pub use queue::{MessageQueue, QueueError, StepQueues};
pub use worker::spawn_worker;
