// SPDX-License-Identifier: MIT

//! TOML parsing for project configuration (syntactic layer).
//!
//! No validation happens here - that's the job of the loader.

use super::types::RawConfig;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// TOML syntax error
    #[error("TOML syntax error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error reading file
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parse a configuration document from TOML string content.
pub fn parse_config(toml_content: &str) -> Result<RawConfig, ParseError> {
    let config: RawConfig = toml::from_str(toml_content)?;
    Ok(config)
}

/// Parse a configuration document from a TOML file.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_config(&content)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
