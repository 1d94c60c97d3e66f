// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! xb-core: core types for the expbench experiment engine
//!
//! This crate provides:
//! - Entity records for projects, jobs, and tasks
//! - Closed status enumerations with checked transitions
//! - Progress events emitted by the orchestrator
//! - Clock and id-generation abstractions
//! - Pure run-report aggregation over persisted task state

pub mod clock;
pub mod id;

pub mod job;
pub mod progress;
pub mod project;
pub mod report;
pub mod status;
pub mod task;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use job::JobRecord;
pub use progress::ProgressEvent;
pub use project::ProjectRecord;
pub use report::{model_summary, RunReport};
pub use status::{JobStatus, TaskStatus, TransitionError};
pub use task::TaskRecord;
