// SPDX-License-Identifier: MIT

//! Materialized state from operation log replay

use crate::op::Operation;
use std::collections::{BTreeMap, HashMap};
use xb_core::{JobRecord, ProjectRecord, TaskRecord, TaskStatus};

/// Materialized state built from store operations.
///
/// `apply` is total: operations that reference a missing row or an
/// illegal transition are skipped (with a warning) instead of poisoning
/// replay. The [`Store`](crate::Store) validates before appending, so
/// skips only happen on a corrupted or hand-edited log.
#[derive(Debug, Default)]
pub struct MaterializedState {
    pub projects: HashMap<String, ProjectRecord>,
    jobs: HashMap<String, JobRecord>,
    tasks: HashMap<String, TaskRecord>,
    /// Insertion order doubles as creation order
    job_order: Vec<String>,
    task_order: Vec<String>,
}

impl MaterializedState {
    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::ProjectSave {
                id,
                name,
                description,
                folder,
            } => {
                self.projects.insert(
                    id.clone(),
                    ProjectRecord {
                        id: id.clone(),
                        name: name.clone(),
                        description: description.clone(),
                        folder: folder.clone(),
                    },
                );
            }

            Operation::JobStart {
                id,
                project_id,
                created_at,
            } => {
                self.jobs
                    .insert(id.clone(), JobRecord::new(id.clone(), project_id, *created_at));
                self.job_order.push(id.clone());
            }

            Operation::JobUpdate {
                id,
                status,
                total_tasks,
                current_task,
                details,
            } => {
                if let Some(job) = self.jobs.get_mut(id) {
                    if let Err(e) =
                        job.update(*status, *total_tasks, *current_task, details.clone())
                    {
                        tracing::warn!(job_id = %id, error = %e, "skipping job update");
                    }
                }
            }

            Operation::JobFinish {
                id,
                status,
                details,
                finished_at,
            } => {
                if let Some(job) = self.jobs.get_mut(id) {
                    if let Err(e) = job.finish(*status, details.clone(), *finished_at) {
                        tracing::warn!(job_id = %id, error = %e, "skipping job finish");
                    }
                }
            }

            Operation::TaskStart {
                id,
                job_id,
                challenge_id,
                ordinal,
                created_at,
            } => {
                self.tasks.insert(
                    id.clone(),
                    TaskRecord::new(id.clone(), job_id, challenge_id, *ordinal, *created_at),
                );
                self.task_order.push(id.clone());
            }

            Operation::TaskExecuted {
                id,
                input,
                output,
                details,
                logs,
                executed_at,
            } => {
                if let Some(task) = self.tasks.get_mut(id) {
                    if let Err(e) = task.record_execution(
                        input.clone(),
                        output.clone(),
                        details.clone(),
                        logs.clone(),
                        *executed_at,
                    ) {
                        tracing::warn!(task_id = %id, error = %e, "skipping task execution");
                    }
                }
            }

            Operation::TaskEvaluated {
                id,
                spec,
                passed,
                score,
                details,
                logs,
                evaluated_at,
            } => {
                if let Some(task) = self.tasks.get_mut(id) {
                    if let Err(e) = task.record_evaluation(
                        spec.clone(),
                        *passed,
                        *score,
                        details.clone(),
                        logs.clone(),
                        *evaluated_at,
                    ) {
                        tracing::warn!(task_id = %id, error = %e, "skipping task evaluation");
                    }
                }
            }

            Operation::TaskCompleted { id, finished_at } => {
                if let Some(task) = self.tasks.get_mut(id) {
                    if let Err(e) = task.complete_without_eval(*finished_at) {
                        tracing::warn!(task_id = %id, error = %e, "skipping task completion");
                    }
                }
            }

            Operation::TaskFail {
                id,
                error,
                finished_at,
            } => {
                if let Some(task) = self.tasks.get_mut(id) {
                    if let Err(e) = task.record_failure(error.clone(), *finished_at) {
                        tracing::warn!(task_id = %id, error = %e, "skipping task failure");
                    }
                }
            }
        }
    }

    /// Get a job by identifier
    pub fn job(&self, id: &str) -> Option<&JobRecord> {
        self.jobs.get(id)
    }

    /// Get a task by identifier
    pub fn task(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.get(id)
    }

    /// Jobs of a project, newest first, with offset/limit applied after
    /// ordering.
    pub fn recent_jobs(&self, project_id: &str, limit: usize, offset: usize) -> Vec<&JobRecord> {
        let mut jobs: Vec<&JobRecord> = self
            .job_order
            .iter()
            .rev()
            .filter_map(|id| self.jobs.get(id))
            .filter(|job| job.project_id == project_id)
            .collect();
        // Stable sort keeps reverse-insertion order among equal timestamps
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.into_iter().skip(offset).take(limit).collect()
    }

    /// All tasks of a job in ordinal order
    pub fn tasks_for_job(&self, job_id: &str) -> Vec<&TaskRecord> {
        let mut tasks: Vec<&TaskRecord> = self
            .tasks
            .values()
            .filter(|task| task.job_id == job_id)
            .collect();
        tasks.sort_by_key(|task| task.ordinal);
        tasks
    }

    /// Task id to status mapping for one job
    pub fn status_map(&self, job_id: &str) -> BTreeMap<String, TaskStatus> {
        self.tasks
            .values()
            .filter(|task| task.job_id == job_id)
            .map(|task| (task.id.clone(), task.status))
            .collect()
    }

    /// Tasks sharing a challenge identifier across all jobs of a
    /// project, newest first, with offset/limit applied after ordering.
    pub fn same_tasks(
        &self,
        project_id: &str,
        challenge_id: &str,
        limit: usize,
        offset: usize,
    ) -> Vec<&TaskRecord> {
        let mut tasks: Vec<&TaskRecord> = self
            .task_order
            .iter()
            .rev()
            .filter_map(|id| self.tasks.get(id))
            .filter(|task| task.challenge_id == challenge_id)
            .filter(|task| {
                self.jobs
                    .get(&task.job_id)
                    .is_some_and(|job| job.project_id == project_id)
            })
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks.into_iter().skip(offset).take(limit).collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
