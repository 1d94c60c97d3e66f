// SPDX-License-Identifier: MIT

//! Job record and lifecycle
//!
//! A job is one end-to-end run of a project's task list. It is created
//! once, mutated once per progress event, and finalized exactly once.

use crate::status::{JobStatus, TransitionError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A persisted job row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub project_id: String,
    pub status: JobStatus,
    pub total_tasks: u32,
    pub current_task: Option<u32>,
    /// Opaque snapshot of the latest progress event (UI echoes this)
    pub details: Value,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// Create a job in the `starting` state with no tasks counted yet
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            status: JobStatus::Starting,
            total_tasks: 0,
            current_task: None,
            details: Value::Null,
            created_at,
            finished_at: None,
        }
    }

    /// Apply a progress snapshot.
    ///
    /// `total_tasks` is fixed at job start by the project configuration;
    /// updates simply re-assert it. Rejects backward status moves and
    /// terminal statuses: a terminal status must land through `finish`,
    /// which also stamps `finished_at`.
    pub fn update(
        &mut self,
        status: JobStatus,
        total_tasks: u32,
        current_task: Option<u32>,
        details: Option<Value>,
    ) -> Result<(), TransitionError> {
        if status.is_terminal() {
            return Err(TransitionError {
                kind: "job",
                from: self.status.to_string(),
                to: status.to_string(),
            });
        }
        self.status = self.status.advance_to(status)?;
        self.total_tasks = total_tasks;
        self.current_task = current_task;
        if let Some(details) = details {
            self.details = details;
        }
        Ok(())
    }

    /// Finalize the job with a terminal status, an optional final details
    /// payload, and the finish timestamp.
    ///
    /// Set at most once; a second finalization is a transition error.
    pub fn finish(
        &mut self,
        status: JobStatus,
        details: Option<Value>,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if !status.is_terminal() || self.finished_at.is_some() {
            return Err(TransitionError {
                kind: "job",
                from: self.status.to_string(),
                to: status.to_string(),
            });
        }
        self.status = self.status.advance_to(status)?;
        if let Some(details) = details {
            self.details = details;
        }
        self.finished_at = Some(at);
        Ok(())
    }

    /// Check if the job reached a terminal status
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
