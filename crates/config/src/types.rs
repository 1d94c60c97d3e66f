// SPDX-License-Identifier: MIT

//! Raw configuration types that mirror TOML structure exactly.
//!
//! These types are used for parsing only. They are converted to
//! validated runtime types by the loader.

use serde::Deserialize;

/// A project configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Project identity block
    pub project: Option<RawProject>,
    /// Optional meta settings
    pub meta: Option<RawMeta>,
    /// Ordered task declarations
    pub task: Vec<RawTask>,
}

/// The `[project]` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProject {
    /// Unique project identifier (required)
    pub id: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Free-text description
    pub description: Option<String>,
}

/// The `[meta]` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMeta {
    /// Probability in [0,1] of injecting a simulated execution failure
    /// before the runner is invoked (testing the failure path)
    pub fail_simulate: Option<f64>,
}

/// One `[[task]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTask {
    /// Stable challenge identifier; defaults to `task-<ordinal>`
    pub id: Option<String>,
    /// Named parameters handed verbatim to the task runner
    pub params: toml::Table,
    /// Evaluation specification; absent means the gate is skipped
    pub eval: Option<RawEval>,
}

/// A `[task.eval]` block.
///
/// Unknown keys are retained so that an unsupported evaluator kind
/// surfaces as a per-task evaluation error, not a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEval {
    /// Checklist items for the checklist evaluator
    pub checklist: Option<Vec<String>>,
    /// Minimum passing score; defaults to 1.0
    pub min_score: Option<f64>,
    /// Any other evaluator kinds named in the block
    #[serde(flatten)]
    pub extra: toml::Table,
}
