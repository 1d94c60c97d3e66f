// SPDX-License-Identifier: MIT

//! Experiment orchestrator
//!
//! Drives one job over its declared task list, strictly in order. Every
//! transition is persisted before the loop moves on, so concurrent
//! status readers only ever see the latest state. Per-task errors are
//! recorded on the task row and the loop continues; configuration and
//! orchestration errors terminate the whole job.

use crate::checklist::Classifier;
use crate::error::{ConfigurationError, ExecutionError, JobError};
use crate::evaluate::evaluate;
use crate::fault;
use crate::runner::{RunnerLoader, TaskRunner};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use xb_config::{load_project_config, TaskSpec};
use xb_core::{Clock, IdGen, JobStatus, ProgressEvent, TaskStatus};
use xb_storage::{Store, StoreError};

/// Runs jobs against a store, a runner loader, and a classifier
#[derive(Clone)]
pub struct Orchestrator<C: Clock, I: IdGen> {
    store: Store<C, I>,
    loader: Arc<dyn RunnerLoader>,
    classifier: Arc<dyn Classifier>,
}

impl<C: Clock, I: IdGen> Orchestrator<C, I> {
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

    /// Run a job to completion.
    ///
    /// The job row must already exist in the `starting` state. Never
    /// returns an error: every failure path ends with a persisted
    /// `failed` job row.
    pub async fn run_job(&self, job_id: &str, folder: &Path) {
        if let Err(error) = self.run_inner(job_id, folder).await {
            tracing::error!(job_id, %error, "job failed");
            self.finalize_failed(job_id, &error);
        }
    }

    async fn run_inner(&self, job_id: &str, folder: &Path) -> Result<(), JobError> {
        let config = load_project_config(folder).map_err(ConfigurationError::from)?;
        let runner = self.loader.load(folder).await?;

        let total = config.tasks.len() as u32;
        tracing::info!(job_id, total, "job starting");
        self.persist(job_id, &ProgressEvent::Starting { total })?;

        let mut results = Vec::with_capacity(config.tasks.len());
        for (index, task) in config.tasks.iter().enumerate() {
            let current = index as u32 + 1;
            let task_id = self
                .store
                .start_task(job_id, &task.challenge_id, current)?;
            self.persist(
                job_id,
                &ProgressEvent::Running {
                    current,
                    total,
                    details: task.challenge_id.clone(),
                },
            )?;

            let result = self
                .process_task(&task_id, task, runner.as_ref(), config.fail_simulate)
                .await?;
            results.push(result);
        }

        tracing::info!(job_id, "job completed");
        self.persist(
            job_id,
            &ProgressEvent::Completed {
                current: total,
                total,
                results,
            },
        )?;
        Ok(())
    }

    /// Execute and evaluate one task.
    ///
    /// Execution and evaluation errors are recorded on the task row and
    /// returned as an error entry in the results list; only store
    /// failures propagate.
    async fn process_task(
        &self,
        task_id: &str,
        task: &TaskSpec,
        runner: &dyn TaskRunner,
        fail_simulate: Option<f64>,
    ) -> Result<Value, StoreError> {
        let run = if fault::should_inject(fail_simulate) {
            Err(ExecutionError::Simulated)
        } else {
            runner.run(&task.params).await
        };
        let run = match run {
            Ok(run) => run,
            Err(error) => {
                let message = error.to_string();
                tracing::warn!(task_id, %message, "task execution failed");
                self.store.fail_task(task_id, &message)?;
                return Ok(json!({ "error": message }));
            }
        };

        self.store.task_executed(
            task_id,
            run.input.clone(),
            run.output.clone(),
            run.details.clone(),
            run.logs.clone(),
        )?;

        let Some(spec) = &task.eval else {
            // No gate declared: the task completes with the pass
            // boolean left unset
            self.store.task_completed(task_id)?;
            return Ok(json!({ "output": run.output }));
        };

        match evaluate(self.classifier.as_ref(), spec, &run.input, &run.output).await {
            Ok(evaluation) => {
                self.store.task_evaluated(
                    task_id,
                    spec.to_value(),
                    evaluation.passed,
                    evaluation.score,
                    evaluation.details,
                    None,
                )?;
                Ok(json!({
                    "output": run.output,
                    "passed": evaluation.passed,
                    "score": evaluation.score,
                }))
            }
            Err(error) => {
                let message = error.to_string();
                tracing::warn!(task_id, %message, "task evaluation failed");
                self.store.fail_task(task_id, &message)?;
                Ok(json!({ "error": message }))
            }
        }
    }

    /// Persist a progress event onto the job row, with the current task
    /// status map injected into the details payload.
    fn persist(&self, job_id: &str, event: &ProgressEvent) -> Result<(), StoreError> {
        let status_map = self.store.task_status_map(job_id);
        let payload = event.to_payload(&status_map);
        let status = event.job_status();
        if status.is_terminal() {
            self.store.finish_job(job_id, status, Some(payload))
        } else {
            self.store
                .update_job(job_id, status, event.total(), event.current(), Some(payload))
        }
    }

    /// Record a job-level failure.
    ///
    /// Tasks that never reached a terminal state are reflected as
    /// failed in the final status map without mutating their rows.
    fn finalize_failed(&self, job_id: &str, error: &JobError) {
        let mut status_map = self.store.task_status_map(job_id);
        mark_unresolved_failed(&mut status_map);

        let total = self
            .store
            .find_job(job_id)
            .map(|job| job.total_tasks)
            .unwrap_or(0);
        let event = ProgressEvent::Failed {
            total,
            error: error.to_string(),
        };
        let payload = event.to_payload(&status_map);
        if let Err(error) = self.store.finish_job(job_id, JobStatus::Failed, Some(payload)) {
            tracing::error!(job_id, %error, "could not record job failure");
        }
    }
}

/// Fold a status map into the shape a failed job reports: anything not
/// yet terminal shows as failed, terminal verdicts stay as recorded.
fn mark_unresolved_failed(status_map: &mut BTreeMap<String, TaskStatus>) {
    for status in status_map.values_mut() {
        if !status.is_terminal() {
            *status = TaskStatus::Failed;
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
