// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! autotrail-core: DAG primitives and the topological traversal engine.
//!
//! This crate is intentionally free of any async runtime dependency — it
//! models the trail's graph and readiness algorithm as plain data and
//! synchronous functions. Execution (workers, message queues, sockets)
//! lives in `autotrail-engine` and `autotrail-daemon`.

pub mod macros;

pub mod engine;
pub mod error;
pub mod id;
pub mod state;
pub mod trail;

#[cfg(any(test, feature = "test-support"))]
pub mod proptest_support;

pub use engine::{Readiness, TopoEngine};
pub use error::Error;
pub use id::short;
pub use state::{StepFlags, StepState, StepStatus};
pub use trail::{Step, StepId, Trail, TrailBuilder};

crate::define_id! {
    /// Unique identifier for a trail run (process-wide, one per `TrailServer::start`).
    pub struct RunId("run-");
}
