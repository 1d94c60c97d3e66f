// SPDX-License-Identifier: MIT

//! Task runner adapter
//!
//! The runner is project-supplied code. It is resolved at job start,
//! not at process start, so project changes take effect without
//! restarting the host. The production implementation runs the
//! project's entry point as a subprocess: task parameters go in as JSON
//! on stdin, the captured result comes back as JSON on stdout.

use crate::error::{ConfigurationError, ExecutionError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Conventional entry point name inside a project's `.xb` directory
pub const RUNNER_ENTRY: &str = "run_task";

/// Captured result of one runner invocation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskRun {
    /// What the task was asked to do
    #[serde(default)]
    pub input: Value,
    /// What the task produced
    #[serde(default)]
    pub output: Value,
    /// Auxiliary data, e.g. a `model` key for attribution
    #[serde(default)]
    pub details: Value,
    #[serde(default)]
    pub logs: Option<Value>,
}

/// Executes one task given its declared parameters
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run(&self, params: &Value) -> Result<TaskRun, ExecutionError>;
}

/// Resolves the runner for a project folder at job start.
///
/// A missing entry point is a configuration error that fails the whole
/// job before any task is attempted.
#[async_trait]
pub trait RunnerLoader: Send + Sync {
    async fn load(&self, folder: &Path) -> Result<Box<dyn TaskRunner>, ConfigurationError>;
}

/// Runs the project's entry point as a subprocess
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl TaskRunner for ProcessRunner {
    async fn run(&self, params: &Value) -> Result<TaskRun, ExecutionError> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(params.to_string().as_bytes()).await?;
            // Close stdin so the runner sees EOF
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExecutionError::Runner(stderr.trim().to_string()));
        }

        let run: TaskRun = serde_json::from_slice(&output.stdout)?;
        Ok(run)
    }
}

/// Loader for the conventional `.xb/run_task` entry point
#[derive(Clone, Default)]
pub struct ProcessRunnerLoader;

#[async_trait]
impl RunnerLoader for ProcessRunnerLoader {
    async fn load(&self, folder: &Path) -> Result<Box<dyn TaskRunner>, ConfigurationError> {
        let path = folder.join(xb_config::CONFIG_DIR).join(RUNNER_ENTRY);
        if !path.exists() {
            return Err(ConfigurationError::MissingRunner { path });
        }
        Ok(Box::new(ProcessRunner::new(path)))
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
