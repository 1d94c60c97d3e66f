// SPDX-License-Identifier: MIT

//! Persisted operations
//!
//! One variant per store mutation. Operations carry their own
//! timestamps so that log replay reproduces state exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use xb_core::JobStatus;

/// A single durable mutation of the materialized state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Upsert a project by identifier
    ProjectSave {
        id: String,
        name: String,
        description: String,
        folder: PathBuf,
    },

    /// Insert a job row in the `starting` state
    JobStart {
        id: String,
        project_id: String,
        created_at: DateTime<Utc>,
    },

    /// Apply a progress snapshot to a job row
    JobUpdate {
        id: String,
        status: JobStatus,
        total_tasks: u32,
        current_task: Option<u32>,
        details: Option<Value>,
    },

    /// Finalize a job with a terminal status
    JobFinish {
        id: String,
        status: JobStatus,
        details: Option<Value>,
        finished_at: DateTime<Utc>,
    },

    /// Insert a task row in the `running` state
    TaskStart {
        id: String,
        job_id: String,
        challenge_id: String,
        ordinal: u32,
        created_at: DateTime<Utc>,
    },

    /// Capture runner output; task moves to `evaluating`
    TaskExecuted {
        id: String,
        input: Value,
        output: Value,
        details: Value,
        logs: Option<Value>,
        executed_at: DateTime<Utc>,
    },

    /// Capture evaluator verdict; task settles terminal per `passed`
    TaskEvaluated {
        id: String,
        spec: Value,
        passed: bool,
        score: f64,
        details: Value,
        logs: Option<Value>,
        evaluated_at: DateTime<Utc>,
    },

    /// Complete a task that declared no evaluation
    TaskCompleted {
        id: String,
        finished_at: DateTime<Utc>,
    },

    /// Mark a task failed with a captured error message
    TaskFail {
        id: String,
        error: String,
        finished_at: DateTime<Utc>,
    },
}

impl Operation {
    /// Short operation name for tracing
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ProjectSave { .. } => "project_save",
            Operation::JobStart { .. } => "job_start",
            Operation::JobUpdate { .. } => "job_update",
            Operation::JobFinish { .. } => "job_finish",
            Operation::TaskStart { .. } => "task_start",
            Operation::TaskExecuted { .. } => "task_executed",
            Operation::TaskEvaluated { .. } => "task_evaluated",
            Operation::TaskCompleted { .. } => "task_completed",
            Operation::TaskFail { .. } => "task_fail",
        }
    }
}
