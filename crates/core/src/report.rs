// SPDX-License-Identifier: MIT

//! Run report aggregation
//!
//! Pure, read-only summary statistics over persisted task state. Safe to
//! call at any point during or after a job: tasks that have not reached
//! a terminal classified state yet count towards `regression`.

use crate::status::TaskStatus;
use crate::task::TaskRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Aggregated statistics for one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    /// Tasks not (yet) classified as passed or failed
    pub regression: u32,
    /// passed / total, zero for an empty job
    pub score: f64,
    /// Derived model attribution, see [`model_summary`]
    pub model: String,
}

impl RunReport {
    /// Aggregate from task statuses alone; model attribution stays unknown.
    pub fn from_statuses<'a>(statuses: impl IntoIterator<Item = &'a TaskStatus>) -> Self {
        let mut total = 0u32;
        let mut passed = 0u32;
        let mut failed = 0u32;
        for status in statuses {
            total += 1;
            match status {
                TaskStatus::Completed => passed += 1,
                TaskStatus::Failed => failed += 1,
                TaskStatus::Running | TaskStatus::Evaluating => {}
            }
        }
        Self::from_counts(total, passed, failed, model_summary([]))
    }

    /// Aggregate from full task rows, deriving model attribution from the
    /// `model` key of each task's captured execution details.
    pub fn from_tasks(tasks: &[TaskRecord]) -> Self {
        let statuses: Vec<&TaskStatus> = tasks.iter().map(|t| &t.status).collect();
        let models: BTreeSet<&str> = tasks
            .iter()
            .filter_map(|t| t.task_details.get("model"))
            .filter_map(|v| v.as_str())
            .collect();

        let mut report = Self::from_statuses(statuses);
        report.model = model_summary(models);
        report
    }

    fn from_counts(total: u32, passed: u32, failed: u32, model: String) -> Self {
        let regression = total.saturating_sub(passed + failed);
        let score = if total == 0 {
            0.0
        } else {
            f64::from(passed) / f64::from(total)
        };
        Self {
            total,
            passed,
            failed,
            regression,
            score,
            model,
        }
    }
}

/// Summarize distinct model identifiers into one attribution string:
/// `"unknown"` if none, the value itself if one, a joined pair if two,
/// `"multiple"` otherwise.
pub fn model_summary<'a>(models: impl IntoIterator<Item = &'a str>) -> String {
    let distinct: BTreeSet<&str> = models.into_iter().collect();
    let mut iter = distinct.iter();
    match distinct.len() {
        0 => "unknown".to_string(),
        1 => iter.next().map(ToString::to_string).unwrap_or_default(),
        2 => {
            let first = iter.next().unwrap_or(&"");
            let second = iter.next().unwrap_or(&"");
            format!("{}, {}", first, second)
        }
        _ => "multiple".to_string(),
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
