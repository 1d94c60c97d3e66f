// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! xb-storage: durable state store for expbench
//!
//! Every mutation is an [`Operation`] appended to an operation log and
//! applied to an in-memory materialized state. Reopening a store
//! replays the log, so the materialized state is always a pure function
//! of the operation history.
//!
//! The [`Store`] handle exposes the engine's state operations: project
//! upsert/lookup, job lifecycle and pagination, task lifecycle and
//! status maps.

mod log;
mod op;
mod state;
mod store;

pub use log::{OpLog, OpLogError};
pub use op::Operation;
pub use state::MaterializedState;
pub use store::{Store, StoreError};
