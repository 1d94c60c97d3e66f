// SPDX-License-Identifier: MIT

//! Engine error taxonomy
//!
//! Per-task errors ([`ExecutionError`], [`EvaluationError`]) are caught
//! by the orchestrator and recorded on the task row; the loop continues.
//! Job-level errors ([`ConfigurationError`], [`OrchestrationError`])
//! terminate the whole job with status `failed`.

use std::path::PathBuf;
use thiserror::Error;
use xb_storage::StoreError;

/// Fatal to the job before any task starts
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(transparent)]
    Config(#[from] xb_config::LoadError),

    #[error("task runner entry point not found at {path}")]
    MissingRunner { path: PathBuf },
}

/// A single task's runner failed; isolated to that task
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to invoke runner: {0}")]
    Io(#[from] std::io::Error),

    #[error("runner failed: {0}")]
    Runner(String),

    #[error("runner produced invalid output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    /// Injected by the configured failure-simulation probability
    #[error("simulated execution failure")]
    Simulated,
}

/// The evaluator rejected the spec or failed internally; isolated to
/// that task
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("no supported evaluator in spec (found: {kinds:?})")]
    UnsupportedSpec { kinds: Vec<String> },

    #[error("classifier error: {0}")]
    Classifier(String),
}

/// Unexpected failure in the control loop itself; fatal to the job
#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Any error that terminates a job
#[derive(Debug, Error)]
pub enum JobError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("orchestration error: {0}")]
    Orchestration(#[from] OrchestrationError),
}

impl From<StoreError> for JobError {
    fn from(err: StoreError) -> Self {
        JobError::Orchestration(OrchestrationError::Store(err))
    }
}
