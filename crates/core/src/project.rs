// SPDX-License-Identifier: MIT

//! Project record

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A project owning zero or more jobs.
///
/// Projects are upserted by identifier and never deleted. The `folder`
/// points at the project checkout containing its `.xb/` configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub folder: PathBuf,
}
