// SPDX-License-Identifier: MIT

//! Append-only operation log
//!
//! One JSON entry per line. Appends are synced to disk before the
//! in-memory state is updated, so a crash never loses an acknowledged
//! mutation.

use crate::op::Operation;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

/// Failures while appending to or replaying the log
#[derive(Debug, Error)]
pub enum OpLogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct LogEntry {
    seq: u64,
    op: Operation,
}

/// Append-only log of store operations
pub struct OpLog {
    file: File,
    sequence: u64,
}

impl OpLog {
    /// Open the log, creating the file and its parent directory as
    /// needed
    pub fn open(path: &Path) -> Result<Self, OpLogError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        // The sequence resumes at the number of entries already on disk
        let reader = BufReader::new(File::open(path)?);
        let sequence = reader.lines().count() as u64;

        Ok(Self { file, sequence })
    }

    /// Append an operation and sync it to disk
    pub fn append(&mut self, op: &Operation) -> Result<u64, OpLogError> {
        self.sequence += 1;
        let entry = LogEntry {
            seq: self.sequence,
            op: op.clone(),
        };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{}", line)?;
        self.file.sync_all()?;
        Ok(self.sequence)
    }

    /// Current sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Replay all operations from a log file, oldest first.
    ///
    /// A missing file is an empty history, not an error.
    pub fn replay(path: &Path) -> Result<Vec<Operation>, OpLogError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(file);
        let mut ops = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let entry: LogEntry = serde_json::from_str(&line)?;
            ops.push(entry.op);
        }
        Ok(ops)
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
