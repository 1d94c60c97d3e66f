// SPDX-License-Identifier: MIT

//! Job and task status enumerations
//!
//! Statuses are closed variant types rather than free-form strings so
//! that illegal states are unrepresentable. Transitions only ever move
//! forward; the store rejects anything else.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A status transition that would move an entity backwards
#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal {kind} transition: {from} -> {to}")]
pub struct TransitionError {
    pub kind: &'static str,
    pub from: String,
    pub to: String,
}

/// Status of a job over its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job row created, orchestrator not yet iterating tasks
    Starting,
    /// Orchestrator is driving the task list
    Running,
    /// All tasks processed (individual tasks may still have failed)
    Completed,
    /// Configuration or orchestration error terminated the job
    Failed,
}

impl JobStatus {
    /// Check if the job reached a terminal status
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Check whether moving to `next` is a legal forward transition.
    ///
    /// Re-asserting the current status is allowed: the orchestrator
    /// persists a snapshot after every per-task step, so consecutive
    /// `running` updates are routine.
    pub fn can_advance_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        match (self, next) {
            (Starting, Starting | Running | Completed | Failed) => true,
            (Running, Running | Completed | Failed) => true,
            (Running, Starting) => false,
            // Terminal statuses never move
            (Completed | Failed, _) => false,
        }
    }

    fn check(self, next: JobStatus) -> Result<(), TransitionError> {
        if self.can_advance_to(next) {
            Ok(())
        } else {
            Err(TransitionError {
                kind: "job",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Validate and return the next status
    pub fn advance_to(self, next: JobStatus) -> Result<JobStatus, TransitionError> {
        self.check(next)?;
        Ok(next)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Starting => "starting",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Status of a single task within a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task row created, runner invocation pending or in flight
    Running,
    /// Execution captured, evaluator gate in flight
    Evaluating,
    /// Executed and passed evaluation (or no evaluation declared)
    Completed,
    /// Execution or evaluation error, or evaluation did not pass
    Failed,
}

impl TaskStatus {
    /// Check if the task reached a terminal status
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Legal forward transitions:
    /// `running -> evaluating -> completed | failed` and `running -> failed`.
    /// A task never returns to `running` once it starts evaluating.
    pub fn can_advance_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        match (self, next) {
            (Running, Evaluating | Completed | Failed) => true,
            (Evaluating, Completed | Failed) => true,
            (Running, Running) | (Evaluating, Running | Evaluating) => false,
            (Completed | Failed, _) => false,
        }
    }

    /// Validate and return the next status
    pub fn advance_to(self, next: TaskStatus) -> Result<TaskStatus, TransitionError> {
        if self.can_advance_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                kind: "task",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Running => "running",
            TaskStatus::Evaluating => "evaluating",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
