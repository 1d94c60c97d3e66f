// SPDX-License-Identifier: MIT

use super::*;
use serde_json::json;

fn job() -> JobRecord {
    JobRecord::new("job-1", "proj", Utc::now())
}

#[test]
fn new_job_is_starting_with_no_progress() {
    let job = job();
    assert_eq!(job.status, JobStatus::Starting);
    assert_eq!(job.total_tasks, 0);
    assert_eq!(job.current_task, None);
    assert!(job.finished_at.is_none());
}

#[test]
fn update_applies_progress_snapshot() {
    let mut job = job();
    job.update(
        JobStatus::Running,
        3,
        Some(1),
        Some(json!({"status": "running", "current": 1})),
    )
    .unwrap();
    assert_eq!(job.status, JobStatus::Running);
    assert_eq!(job.total_tasks, 3);
    assert_eq!(job.current_task, Some(1));
    assert_eq!(job.details["current"], 1);
}

#[test]
fn update_keeps_details_when_none_given() {
    let mut job = job();
    job.update(JobStatus::Running, 2, Some(1), Some(json!({"a": 1})))
        .unwrap();
    job.update(JobStatus::Running, 2, Some(2), None).unwrap();
    assert_eq!(job.details, json!({"a": 1}));
}

#[test]
fn update_rejects_backward_move() {
    let mut job = job();
    job.update(JobStatus::Running, 2, Some(1), None).unwrap();
    let err = job
        .update(JobStatus::Starting, 2, None, None)
        .unwrap_err();
    assert_eq!(err.from, "running");
}

#[test]
fn update_rejects_terminal_status() {
    let mut job = job();
    job.update(JobStatus::Running, 2, Some(1), None).unwrap();
    assert!(job.update(JobStatus::Completed, 2, Some(2), None).is_err());
    assert!(job.update(JobStatus::Failed, 2, Some(2), None).is_err());
    // Still running, still finishable
    assert_eq!(job.status, JobStatus::Running);
    job.finish(JobStatus::Completed, None, Utc::now()).unwrap();
}

#[test]
fn finish_sets_terminal_status_and_timestamp_once() {
    let mut job = job();
    job.update(JobStatus::Running, 1, Some(1), None).unwrap();

    let done_at = Utc::now();
    job.finish(JobStatus::Completed, Some(json!({"results": []})), done_at)
        .unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.finished_at, Some(done_at));
    assert!(job.is_terminal());

    // Second finalization is rejected
    assert!(job.finish(JobStatus::Failed, None, Utc::now()).is_err());
}

#[test]
fn finish_rejects_non_terminal_status() {
    let mut job = job();
    assert!(job.finish(JobStatus::Running, None, Utc::now()).is_err());
}

#[test]
fn job_can_fail_straight_from_starting() {
    let mut job = job();
    job.finish(
        JobStatus::Failed,
        Some(json!({"error": "config file not found"})),
        Utc::now(),
    )
    .unwrap();
    assert_eq!(job.status, JobStatus::Failed);
}
