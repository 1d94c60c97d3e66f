// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! xb-engine: the experiment engine for expbench
//!
//! This crate provides:
//! - The task runner adapter trait and its subprocess implementation
//! - The evaluator gate with a checklist classifier
//! - Failure injection for exercising the failure path
//! - The orchestrator driving one job over its declared task list
//! - The trigger service consumed by outer surfaces (CLI, HTTP)

mod checklist;
mod error;
mod evaluate;
mod fault;
mod orchestrator;
mod runner;
mod trigger;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use checklist::{ChecklistRequest, Classifier, LlmClassifier, Verdict};
pub use error::{
    ConfigurationError, EvaluationError, ExecutionError, JobError, OrchestrationError,
};
pub use evaluate::{evaluate, Evaluation};
pub use fault::should_inject;
pub use orchestrator::Orchestrator;
pub use runner::{
    ProcessRunner, ProcessRunnerLoader, RunnerLoader, TaskRun, TaskRunner, RUNNER_ENTRY,
};
pub use trigger::{JobSnapshot, RunDetails, RunService, RunSummary, TriggerError};
