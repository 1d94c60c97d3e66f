// SPDX-License-Identifier: MIT

//! Store handle
//!
//! A cloneable handle over the operation log and materialized state.
//! Mutations validate against the current state, append to the log,
//! then apply in memory; reads return cloned rows and never mutate.
//! Lock order is always state before log.

use crate::log::{OpLog, OpLogError};
use crate::op::Operation;
use crate::state::MaterializedState;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use xb_core::{
    Clock, IdGen, JobRecord, JobStatus, ProjectRecord, SystemClock, TaskRecord, TaskStatus,
    TransitionError, UuidIdGen,
};

/// Errors that can occur in store operations.
///
/// Lookups by identifier return `Option` instead; these errors cover
/// mutations against missing rows and illegal lifecycle moves.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("log error: {0}")]
    Log(#[from] OpLogError),
    #[error("job not found: {0}")]
    JobNotFound(String),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Durable state store for projects, jobs, and tasks
#[derive(Clone)]
pub struct Store<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    log: Arc<Mutex<OpLog>>,
    state: Arc<Mutex<MaterializedState>>,
    clock: C,
    id_gen: I,
}

impl Store<SystemClock, UuidIdGen> {
    /// Open a store with the system clock and UUID ids
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with(path, SystemClock, UuidIdGen)
    }
}

impl<C: Clock, I: IdGen> Store<C, I> {
    /// Open a store at the given log path, replaying existing history
    pub fn open_with(path: &Path, clock: C, id_gen: I) -> Result<Self, StoreError> {
        let mut state = MaterializedState::default();
        for op in OpLog::replay(path)? {
            state.apply(&op);
        }
        let log = OpLog::open(path)?;
        Ok(Self {
            log: Arc::new(Mutex::new(log)),
            state: Arc::new(Mutex::new(state)),
            clock,
            id_gen,
        })
    }

    /// Append a pre-validated operation and apply it.
    ///
    /// Callers must hold the state lock they validated under.
    fn commit_locked(
        &self,
        state: &mut MaterializedState,
        op: Operation,
    ) -> Result<(), StoreError> {
        {
            let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());
            log.append(&op)?;
        }
        tracing::debug!(op = op.name(), "committed");
        state.apply(&op);
        Ok(())
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// Idempotent upsert by project identifier
    pub fn save_project(
        &self,
        id: &str,
        name: &str,
        description: &str,
        folder: &Path,
    ) -> Result<ProjectRecord, StoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.commit_locked(
            &mut state,
            Operation::ProjectSave {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                folder: folder.to_path_buf(),
            },
        )?;
        Ok(ProjectRecord {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            folder: folder.to_path_buf(),
        })
    }

    /// Find a project by identifier
    pub fn find_project(&self, id: &str) -> Option<ProjectRecord> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.projects.get(id).cloned()
    }

    /// All known projects
    pub fn list_projects(&self) -> Vec<ProjectRecord> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut projects: Vec<ProjectRecord> = state.projects.values().cloned().collect();
        projects.sort_by(|a, b| a.id.cmp(&b.id));
        projects
    }

    // ========================================================================
    // Jobs
    // ========================================================================

    /// Allocate a fresh job id and insert the row in `starting` state
    pub fn start_job(&self, project_id: &str) -> Result<String, StoreError> {
        let id = self.id_gen.next();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.commit_locked(
            &mut state,
            Operation::JobStart {
                id: id.clone(),
                project_id: project_id.to_string(),
                created_at: self.clock.now(),
            },
        )?;
        Ok(id)
    }

    /// Find a job by identifier
    pub fn find_job(&self, id: &str) -> Option<JobRecord> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.job(id).cloned()
    }

    /// Find a job by identifier, validating project ownership
    pub fn job_status(&self, project_id: &str, job_id: &str) -> Option<JobRecord> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .job(job_id)
            .filter(|job| job.project_id == project_id)
            .cloned()
    }

    /// Apply a progress snapshot to a job row
    pub fn update_job(
        &self,
        id: &str,
        status: JobStatus,
        total_tasks: u32,
        current_task: Option<u32>,
        details: Option<Value>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let job = state
            .job(id)
            .ok_or_else(|| StoreError::JobNotFound(id.to_string()))?;
        let mut probe = job.clone();
        probe.update(status, total_tasks, current_task, details.clone())?;
        self.commit_locked(
            &mut state,
            Operation::JobUpdate {
                id: id.to_string(),
                status,
                total_tasks,
                current_task,
                details,
            },
        )
    }

    /// Finalize a job with a terminal status and finish timestamp
    pub fn finish_job(
        &self,
        id: &str,
        status: JobStatus,
        details: Option<Value>,
    ) -> Result<(), StoreError> {
        let finished_at = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let job = state
            .job(id)
            .ok_or_else(|| StoreError::JobNotFound(id.to_string()))?;
        let mut probe = job.clone();
        probe.finish(status, details.clone(), finished_at)?;
        self.commit_locked(
            &mut state,
            Operation::JobFinish {
                id: id.to_string(),
                status,
                details,
                finished_at,
            },
        )
    }

    /// Jobs of a project, newest first, offset/limit after ordering
    pub fn list_recent_jobs(
        &self,
        project_id: &str,
        limit: usize,
        offset: usize,
    ) -> Vec<JobRecord> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .recent_jobs(project_id, limit, offset)
            .into_iter()
            .cloned()
            .collect()
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    /// Allocate a fresh task id and insert the row in `running` state
    pub fn start_task(
        &self,
        job_id: &str,
        challenge_id: &str,
        ordinal: u32,
    ) -> Result<String, StoreError> {
        let id = self.id_gen.next();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.job(job_id).is_none() {
            return Err(StoreError::JobNotFound(job_id.to_string()));
        }
        self.commit_locked(
            &mut state,
            Operation::TaskStart {
                id: id.clone(),
                job_id: job_id.to_string(),
                challenge_id: challenge_id.to_string(),
                ordinal,
                created_at: self.clock.now(),
            },
        )?;
        Ok(id)
    }

    /// Find a task by identifier
    pub fn find_task(&self, id: &str) -> Option<TaskRecord> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.task(id).cloned()
    }

    /// Capture runner output; the task moves to `evaluating`
    pub fn task_executed(
        &self,
        id: &str,
        input: Value,
        output: Value,
        details: Value,
        logs: Option<Value>,
    ) -> Result<(), StoreError> {
        let executed_at = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let task = state
            .task(id)
            .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))?;
        let mut probe = task.clone();
        probe.record_execution(
            input.clone(),
            output.clone(),
            details.clone(),
            logs.clone(),
            executed_at,
        )?;
        self.commit_locked(
            &mut state,
            Operation::TaskExecuted {
                id: id.to_string(),
                input,
                output,
                details,
                logs,
                executed_at,
            },
        )
    }

    /// Capture the evaluator verdict; terminal status follows `passed`
    pub fn task_evaluated(
        &self,
        id: &str,
        spec: Value,
        passed: bool,
        score: f64,
        details: Value,
        logs: Option<Value>,
    ) -> Result<(), StoreError> {
        let evaluated_at = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let task = state
            .task(id)
            .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))?;
        let mut probe = task.clone();
        probe.record_evaluation(
            spec.clone(),
            passed,
            score,
            details.clone(),
            logs.clone(),
            evaluated_at,
        )?;
        self.commit_locked(
            &mut state,
            Operation::TaskEvaluated {
                id: id.to_string(),
                spec,
                passed,
                score,
                details,
                logs,
                evaluated_at,
            },
        )
    }

    /// Complete a task that declared no evaluation
    pub fn task_completed(&self, id: &str) -> Result<(), StoreError> {
        let finished_at = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let task = state
            .task(id)
            .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))?;
        let mut probe = task.clone();
        probe.complete_without_eval(finished_at)?;
        self.commit_locked(
            &mut state,
            Operation::TaskCompleted {
                id: id.to_string(),
                finished_at,
            },
        )
    }

    /// Mark a task failed with the captured error message
    pub fn fail_task(&self, id: &str, error: &str) -> Result<(), StoreError> {
        let finished_at = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let task = state
            .task(id)
            .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))?;
        let mut probe = task.clone();
        probe.record_failure(error, finished_at)?;
        self.commit_locked(
            &mut state,
            Operation::TaskFail {
                id: id.to_string(),
                error: error.to_string(),
                finished_at,
            },
        )
    }

    /// All tasks of a job in ordinal order
    pub fn list_tasks(&self, job_id: &str) -> Vec<TaskRecord> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .tasks_for_job(job_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Task id to status mapping for one job
    pub fn task_status_map(&self, job_id: &str) -> BTreeMap<String, TaskStatus> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.status_map(job_id)
    }

    /// Historical runs of one challenge across a project's jobs,
    /// newest first
    pub fn find_same_tasks(
        &self,
        project_id: &str,
        challenge_id: &str,
        limit: usize,
        offset: usize,
    ) -> Vec<TaskRecord> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .same_tasks(project_id, challenge_id, limit, offset)
            .into_iter()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
