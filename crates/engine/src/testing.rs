// SPDX-License-Identifier: MIT

//! Fake adapters for tests
//!
//! The fake runner is scripted through task parameters: a `fail` key
//! makes it raise that message, an `output` key becomes the captured
//! output (defaulting to the params themselves), and a `model` key is
//! copied into the captured details for attribution.

use crate::checklist::{ChecklistRequest, Classifier, Verdict};
use crate::error::{ConfigurationError, EvaluationError, ExecutionError};
use crate::runner::{RunnerLoader, TaskRun, TaskRunner, RUNNER_ENTRY};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Scripted in-process runner
#[derive(Clone, Default)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<Value>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters of every invocation, in order
    pub fn calls(&self) -> Vec<Value> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl TaskRunner for FakeRunner {
    async fn run(&self, params: &Value) -> Result<TaskRun, ExecutionError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(params.clone());

        if let Some(message) = params.get("fail").and_then(|v| v.as_str()) {
            return Err(ExecutionError::Runner(message.to_string()));
        }

        let mut details = json!({});
        if let Some(model) = params.get("model") {
            details["model"] = model.clone();
        }
        Ok(TaskRun {
            input: params.clone(),
            output: params.get("output").cloned().unwrap_or_else(|| params.clone()),
            details,
            logs: None,
        })
    }
}

/// Loader handing out clones of one fake runner; `absent()` simulates a
/// missing entry point
#[derive(Clone, Default)]
pub struct FakeRunnerLoader {
    runner: FakeRunner,
    absent: bool,
}

impl FakeRunnerLoader {
    pub fn new(runner: FakeRunner) -> Self {
        Self {
            runner,
            absent: false,
        }
    }

    pub fn absent() -> Self {
        Self {
            runner: FakeRunner::default(),
            absent: true,
        }
    }
}

#[async_trait]
impl RunnerLoader for FakeRunnerLoader {
    async fn load(&self, folder: &Path) -> Result<Box<dyn TaskRunner>, ConfigurationError> {
        if self.absent {
            return Err(ConfigurationError::MissingRunner {
                path: folder.join(xb_config::CONFIG_DIR).join(RUNNER_ENTRY),
            });
        }
        Ok(Box::new(self.runner.clone()))
    }
}

/// Classifier returning a fixed score, or failing outright
#[derive(Clone)]
pub struct FakeClassifier {
    score: f64,
    error: Option<String>,
}

impl FakeClassifier {
    /// Always grade with the given score
    pub fn scoring(score: f64) -> Self {
        Self { score, error: None }
    }

    /// Always fail with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            error: Some(message.into()),
        }
    }
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn grade(&self, request: ChecklistRequest<'_>) -> Result<Verdict, EvaluationError> {
        if let Some(message) = &self.error {
            return Err(EvaluationError::Classifier(message.clone()));
        }
        let evaluations: Vec<Value> = request
            .checklist
            .iter()
            .map(|item| json!({ "requirement": item, "score": self.score }))
            .collect();
        Ok(Verdict {
            score: self.score,
            details: json!({ "evaluations": evaluations }),
        })
    }
}
