// SPDX-License-Identifier: MIT

//! Configuration loader: converts raw TOML types to validated runtime
//! types and resolves the config file within a project folder.

use super::types::{RawConfig, RawEval, RawTask};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Config file absent from the project folder
    #[error("config file not found at {path}")]
    Missing { path: PathBuf },

    /// Parse error
    #[error("parse error: {0}")]
    Parse(#[from] super::parser::ParseError),

    /// Missing required field
    #[error("missing required field '{field}' in {context}")]
    MissingField { field: &'static str, context: String },

    /// Invalid value in field
    #[error("invalid value '{value}' in {field}: expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// Two tasks declared the same challenge identifier
    #[error("duplicate challenge id '{id}'")]
    DuplicateChallenge { id: String },
}

/// A loaded, validated project configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    pub project: ProjectMeta,
    /// Tasks in declaration order
    pub tasks: Vec<TaskSpec>,
    /// Probability of injecting a simulated execution failure
    pub fail_simulate: Option<f64>,
}

/// Project identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectMeta {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// One declared task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    /// Stable identifier grouping this unit across jobs
    pub challenge_id: String,
    /// Parameters handed to the runner, as JSON
    pub params: serde_json::Value,
    /// Evaluation spec; `None` skips the gate
    pub eval: Option<EvalSpec>,
}

/// A task's evaluation specification.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalSpec {
    /// Checklist items, if the checklist evaluator is requested
    pub checklist: Option<Vec<String>>,
    /// Minimum passing score; `passed = score >= min_score`
    pub min_score: f64,
    /// Other evaluator kinds named in the block (unsupported)
    pub other_kinds: Vec<String>,
}

impl EvalSpec {
    /// Serialize for persistence on the task row.
    pub fn to_value(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        if let Some(ref checklist) = self.checklist {
            map.insert(
                "checklist".to_string(),
                serde_json::Value::Array(
                    checklist
                        .iter()
                        .map(|s| serde_json::Value::String(s.clone()))
                        .collect(),
                ),
            );
        }
        if let Some(score) = serde_json::Number::from_f64(self.min_score) {
            map.insert("min_score".to_string(), serde_json::Value::Number(score));
        }
        serde_json::Value::Object(map)
    }
}

/// Path to the configuration file inside a project folder.
pub fn config_path(folder: &Path) -> PathBuf {
    folder.join(super::CONFIG_DIR).join(super::CONFIG_FILE)
}

/// Load and validate the configuration for a project folder.
pub fn load_project_config(folder: &Path) -> Result<ProjectConfig, LoadError> {
    let path = config_path(folder);
    if !path.exists() {
        return Err(LoadError::Missing { path });
    }
    let raw = super::parser::parse_config_file(&path)?;
    load_config(&raw)
}

/// Convert a raw document into a validated [`ProjectConfig`].
pub fn load_config(raw: &RawConfig) -> Result<ProjectConfig, LoadError> {
    let raw_project = raw.project.as_ref().ok_or(LoadError::MissingField {
        field: "project",
        context: "config".to_string(),
    })?;
    let id = raw_project
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or(LoadError::MissingField {
            field: "id",
            context: "project".to_string(),
        })?;

    let project = ProjectMeta {
        name: raw_project.name.clone().unwrap_or_else(|| id.clone()),
        description: raw_project.description.clone().unwrap_or_default(),
        id,
    };

    let fail_simulate = match raw.meta.as_ref().and_then(|m| m.fail_simulate) {
        Some(p) if !(0.0..=1.0).contains(&p) => {
            return Err(LoadError::InvalidValue {
                field: "meta.fail_simulate".to_string(),
                value: p.to_string(),
                expected: "probability in [0, 1]",
            });
        }
        other => other,
    };

    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(raw.task.len());
    for (i, raw_task) in raw.task.iter().enumerate() {
        let task = load_task(raw_task, i + 1)?;
        if !seen.insert(task.challenge_id.clone()) {
            return Err(LoadError::DuplicateChallenge {
                id: task.challenge_id,
            });
        }
        tasks.push(task);
    }

    Ok(ProjectConfig {
        project,
        tasks,
        fail_simulate,
    })
}

/// Load one task entry; `ordinal` is its 1-based position.
fn load_task(raw: &RawTask, ordinal: usize) -> Result<TaskSpec, LoadError> {
    let challenge_id = raw
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("task-{}", ordinal));

    let params = toml_to_json(&toml::Value::Table(raw.params.clone()));
    let eval = raw.eval.as_ref().map(load_eval).transpose()?;

    Ok(TaskSpec {
        challenge_id,
        params,
        eval,
    })
}

fn load_eval(raw: &RawEval) -> Result<EvalSpec, LoadError> {
    let min_score = match raw.min_score {
        Some(score) if !(0.0..=1.0).contains(&score) => {
            return Err(LoadError::InvalidValue {
                field: "eval.min_score".to_string(),
                value: score.to_string(),
                expected: "score in [0, 1]",
            });
        }
        Some(score) => score,
        None => 1.0,
    };

    Ok(EvalSpec {
        checklist: raw.checklist.clone(),
        min_score,
        other_kinds: raw.extra.keys().cloned().collect(),
    })
}

/// Convert a TOML value into JSON for storage and the runner wire format.
fn toml_to_json(value: &toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s.clone()),
        toml::Value::Integer(i) => serde_json::Value::Number((*i).into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        toml::Value::Boolean(b) => serde_json::Value::Bool(*b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
