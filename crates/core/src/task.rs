// SPDX-License-Identifier: MIT

//! Task record and lifecycle
//!
//! A task is one unit of work within a job. On the success path it is
//! mutated twice (after execution, after evaluation); on the failure
//! path it is marked failed once. Rows are never deleted.

use crate::status::{TaskStatus, TransitionError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A persisted task row with captured execution and evaluation data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub job_id: String,
    /// Stable identifier grouping the same logical unit across jobs
    pub challenge_id: String,
    /// 1-based position within the job
    pub ordinal: u32,
    pub status: TaskStatus,
    pub task_input: Value,
    pub task_output: Value,
    pub task_details: Value,
    pub task_logs: Option<Value>,
    pub eval_spec: Value,
    pub eval_passed: Option<bool>,
    pub eval_score: Option<f64>,
    pub eval_details: Value,
    pub eval_logs: Option<Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub evaluated_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Create a task in the `running` state
    pub fn new(
        id: impl Into<String>,
        job_id: impl Into<String>,
        challenge_id: impl Into<String>,
        ordinal: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            job_id: job_id.into(),
            challenge_id: challenge_id.into(),
            ordinal,
            status: TaskStatus::Running,
            task_input: Value::Null,
            task_output: Value::Null,
            task_details: Value::Null,
            task_logs: None,
            eval_spec: Value::Null,
            eval_passed: None,
            eval_score: None,
            eval_details: Value::Null,
            eval_logs: None,
            error: None,
            created_at,
            executed_at: None,
            evaluated_at: None,
            finished_at: None,
        }
    }

    /// Capture the runner's output and move to `evaluating`
    pub fn record_execution(
        &mut self,
        input: Value,
        output: Value,
        details: Value,
        logs: Option<Value>,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.status = self.status.advance_to(TaskStatus::Evaluating)?;
        self.task_input = input;
        self.task_output = output;
        self.task_details = details;
        self.task_logs = logs;
        self.executed_at = Some(at);
        Ok(())
    }

    /// Capture the evaluator verdict and settle the terminal status.
    ///
    /// `passed` decides between `completed` and `failed`.
    pub fn record_evaluation(
        &mut self,
        spec: Value,
        passed: bool,
        score: f64,
        details: Value,
        logs: Option<Value>,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        let terminal = if passed {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };
        self.status = self.status.advance_to(terminal)?;
        self.eval_spec = spec;
        self.eval_passed = Some(passed);
        self.eval_score = Some(score);
        self.eval_details = details;
        self.eval_logs = logs;
        self.evaluated_at = Some(at);
        self.finished_at = Some(at);
        Ok(())
    }

    /// Complete a task that declared no evaluation; the pass boolean
    /// stays unset.
    pub fn complete_without_eval(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        self.status = self.status.advance_to(TaskStatus::Completed)?;
        self.finished_at = Some(at);
        Ok(())
    }

    /// Mark the task failed with the captured error message.
    ///
    /// Legal from both `running` (execution error) and `evaluating`
    /// (evaluation error).
    pub fn record_failure(
        &mut self,
        error: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.status = self.status.advance_to(TaskStatus::Failed)?;
        self.error = Some(error.into());
        self.finished_at = Some(at);
        Ok(())
    }

    /// Check if the task reached a terminal status
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
