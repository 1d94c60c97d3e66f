// SPDX-License-Identifier: MIT

use super::*;
use chrono::Utc;
use tempfile::tempdir;

fn sample_op(id: &str) -> Operation {
    Operation::JobStart {
        id: id.to_string(),
        project_id: "proj".to_string(),
        created_at: Utc::now(),
    }
}

#[test]
fn append_then_replay_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.log");

    let mut log = OpLog::open(&path).unwrap();
    log.append(&sample_op("job-1")).unwrap();
    log.append(&sample_op("job-2")).unwrap();
    assert_eq!(log.sequence(), 2);

    let ops = OpLog::replay(&path).unwrap();
    assert_eq!(ops.len(), 2);
    assert!(matches!(&ops[0], Operation::JobStart { id, .. } if id == "job-1"));
}

#[test]
fn replay_of_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let ops = OpLog::replay(&dir.path().join("absent.log")).unwrap();
    assert!(ops.is_empty());
}

#[test]
fn reopen_restores_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.log");

    {
        let mut log = OpLog::open(&path).unwrap();
        log.append(&sample_op("job-1")).unwrap();
    }

    let mut log = OpLog::open(&path).unwrap();
    assert_eq!(log.sequence(), 1);
    assert_eq!(log.append(&sample_op("job-2")).unwrap(), 2);
}

#[test]
fn open_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("dir").join("state.log");
    let mut log = OpLog::open(&path).unwrap();
    log.append(&sample_op("job-1")).unwrap();
    assert!(path.exists());
}
