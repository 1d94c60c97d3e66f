// SPDX-License-Identifier: MIT

//! Trigger service
//!
//! The surface consumed by the CLI and HTTP layers. `create_job` hands
//! the job off to a detached orchestrator and returns immediately;
//! callers observe progress by polling the read-only views, never via a
//! callback.

use crate::checklist::Classifier;
use crate::orchestrator::Orchestrator;
use crate::runner::RunnerLoader;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use xb_config::load_project_config;
use xb_core::{Clock, IdGen, JobStatus, ProjectRecord, RunReport, TaskRecord, TaskStatus};
use xb_storage::{Store, StoreError};

/// Errors surfaced to the trigger layer
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error(transparent)]
    Config(#[from] xb_config::LoadError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Point-in-time view of one job for status polling
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub project_id: String,
    pub job_id: String,
    pub status: JobStatus,
    pub total_tasks: u32,
    pub current_task: Option<u32>,
    pub task_status_map: BTreeMap<String, TaskStatus>,
    /// Latest progress event payload, echoed opaquely
    pub details: Value,
}

/// One row of the recent-runs listing
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub revision: Option<String>,
    pub model: String,
    pub score: f64,
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub regression: u32,
}

/// Full detail view of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunDetails {
    pub project: ProjectRecord,
    pub job_id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub details: Value,
    pub tasks: Vec<TaskRecord>,
}

/// Job trigger and read-only status views
#[derive(Clone)]
pub struct RunService<C: Clock, I: IdGen> {
    store: Store<C, I>,
    loader: Arc<dyn RunnerLoader>,
    classifier: Arc<dyn Classifier>,
}

impl<C: Clock, I: IdGen> RunService<C, I> {
    pub fn new(
        store: Store<C, I>,
        loader: Arc<dyn RunnerLoader>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            store,
            loader,
            classifier,
        }
    }

    /// Upsert the project row from its config document.
    ///
    /// Idempotent; called before starting jobs so the store always
    /// reflects the on-disk configuration.
    pub fn register_project(&self, folder: &Path) -> Result<ProjectRecord, TriggerError> {
        let config = load_project_config(folder)?;
        let project = self.store.save_project(
            &config.project.id,
            &config.project.name,
            &config.project.description,
            folder,
        )?;
        Ok(project)
    }

    /// Create a job for a registered project and hand it to a detached
    /// orchestrator. Returns as soon as the job row exists.
    pub fn create_job(&self, project_id: &str) -> Result<String, TriggerError> {
        let project = self
            .store
            .find_project(project_id)
            .ok_or_else(|| TriggerError::ProjectNotFound(project_id.to_string()))?;

        let job_id = self.store.start_job(project_id)?;
        tracing::info!(project_id, %job_id, "job created");

        let orchestrator = Orchestrator::new(
            self.store.clone(),
            self.loader.clone(),
            self.classifier.clone(),
        );
        let id = job_id.clone();
        tokio::spawn(async move {
            orchestrator.run_job(&id, &project.folder).await;
        });
        Ok(job_id)
    }

    /// Snapshot a job's progress; `None` when the job does not exist or
    /// belongs to another project.
    pub fn get_job_status(&self, project_id: &str, job_id: &str) -> Option<JobSnapshot> {
        let job = self.store.job_status(project_id, job_id)?;
        Some(JobSnapshot {
            project_id: job.project_id,
            job_id: job.id.clone(),
            status: job.status,
            total_tasks: job.total_tasks,
            current_task: job.current_task,
            task_status_map: self.store.task_status_map(job_id),
            details: job.details,
        })
    }

    /// Recent jobs of a project, newest first, aggregated per run
    pub fn list_recent_runs(
        &self,
        project_id: &str,
        limit: usize,
        offset: usize,
    ) -> Vec<RunSummary> {
        self.store
            .list_recent_jobs(project_id, limit, offset)
            .into_iter()
            .map(|job| {
                let tasks = self.store.list_tasks(&job.id);
                let report = RunReport::from_tasks(&tasks);
                RunSummary {
                    revision: job
                        .details
                        .get("revision")
                        .and_then(|v| v.as_str())
                        .map(String::from),
                    id: job.id,
                    created_at: job.created_at,
                    finished_at: job.finished_at,
                    model: report.model,
                    score: report.score,
                    total: report.total,
                    passed: report.passed,
                    failed: report.failed,
                    regression: report.regression,
                }
            })
            .collect()
    }

    /// Full per-task capture for one run
    pub fn get_run_details(&self, job_id: &str) -> Option<RunDetails> {
        let job = self.store.find_job(job_id)?;
        let project = self.store.find_project(&job.project_id)?;
        Some(RunDetails {
            project,
            job_id: job.id.clone(),
            status: job.status,
            created_at: job.created_at,
            finished_at: job.finished_at,
            details: job.details,
            tasks: self.store.list_tasks(job_id),
        })
    }

    /// Historical runs of one challenge across a project's jobs
    pub fn find_same_tasks(
        &self,
        project_id: &str,
        challenge_id: &str,
        limit: usize,
        offset: usize,
    ) -> Vec<TaskRecord> {
        self.store
            .find_same_tasks(project_id, challenge_id, limit, offset)
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
