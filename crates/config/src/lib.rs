// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! xb-config: project configuration for expbench
//!
//! A project declares its experiment in `.xb/config.toml` inside the
//! project folder: project metadata, optional meta settings, and an
//! ordered list of tasks with runner parameters and evaluation specs.
//!
//! Parsing (syntax) and loading (validation + runtime types) are
//! separate layers: `parser` produces raw mirror types, `loader` turns
//! them into validated [`ProjectConfig`] values.

pub mod loader;
pub mod parser;
pub mod types;

pub use loader::{
    config_path, load_config, load_project_config, EvalSpec, LoadError, ProjectConfig,
    ProjectMeta, TaskSpec,
};
pub use parser::{parse_config, parse_config_file, ParseError};
pub use types::{RawConfig, RawEval, RawMeta, RawProject, RawTask};

/// Directory inside a project folder holding expbench files
pub const CONFIG_DIR: &str = ".xb";

/// Configuration file name within [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.toml";
