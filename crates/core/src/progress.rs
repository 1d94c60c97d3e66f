// SPDX-License-Identifier: MIT

//! Progress events produced by the orchestrator
//!
//! Each event is persisted onto the job row as its `details` payload,
//! with the evolving task status map injected so readers can observe
//! per-task progress from the job row alone.

use crate::status::{JobStatus, TaskStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One step of orchestrator progress for a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProgressEvent {
    /// Task count resolved, loop about to start
    Starting { total: u32 },
    /// Task `current` of `total` is being processed
    Running {
        current: u32,
        total: u32,
        details: String,
    },
    /// All tasks processed; per-task result entries in declaration order
    Completed {
        current: u32,
        total: u32,
        results: Vec<Value>,
    },
    /// The job itself failed (configuration or orchestration error)
    Failed { total: u32, error: String },
}

impl ProgressEvent {
    /// The job status this event drives the job row to
    pub fn job_status(&self) -> JobStatus {
        match self {
            ProgressEvent::Starting { .. } => JobStatus::Starting,
            ProgressEvent::Running { .. } => JobStatus::Running,
            ProgressEvent::Completed { .. } => JobStatus::Completed,
            ProgressEvent::Failed { .. } => JobStatus::Failed,
        }
    }

    /// Current 1-based task position, if the event carries one
    pub fn current(&self) -> Option<u32> {
        match self {
            ProgressEvent::Starting { .. } | ProgressEvent::Failed { .. } => None,
            ProgressEvent::Running { current, .. } | ProgressEvent::Completed { current, .. } => {
                Some(*current)
            }
        }
    }

    /// Declared task count
    pub fn total(&self) -> u32 {
        match self {
            ProgressEvent::Starting { total }
            | ProgressEvent::Running { total, .. }
            | ProgressEvent::Completed { total, .. }
            | ProgressEvent::Failed { total, .. } => *total,
        }
    }

    /// Serialize the event into the job `details` payload, injecting the
    /// task status map alongside the event fields.
    pub fn to_payload(&self, status_map: &BTreeMap<String, TaskStatus>) -> Value {
        let mut payload = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(ref mut map) = payload {
            let statuses: serde_json::Map<String, Value> = status_map
                .iter()
                .map(|(id, status)| (id.clone(), Value::String(status.to_string())))
                .collect();
            map.insert("status_map".to_string(), Value::Object(statuses));
        }
        payload
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
