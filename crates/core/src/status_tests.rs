// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn job_forward_transitions_are_legal() {
    assert!(JobStatus::Starting.can_advance_to(JobStatus::Running));
    assert!(JobStatus::Running.can_advance_to(JobStatus::Completed));
    assert!(JobStatus::Running.can_advance_to(JobStatus::Failed));
    // Config error before any task starts
    assert!(JobStatus::Starting.can_advance_to(JobStatus::Failed));
    // Zero declared tasks: starting goes straight to completed
    assert!(JobStatus::Starting.can_advance_to(JobStatus::Completed));
}

#[test]
fn job_repeated_running_updates_are_legal() {
    assert!(JobStatus::Running.can_advance_to(JobStatus::Running));
}

#[test]
fn job_terminal_statuses_never_move() {
    for next in [
        JobStatus::Starting,
        JobStatus::Running,
        JobStatus::Completed,
        JobStatus::Failed,
    ] {
        assert!(!JobStatus::Completed.can_advance_to(next));
        assert!(!JobStatus::Failed.can_advance_to(next));
    }
}

#[test]
fn task_success_path() {
    let status = TaskStatus::Running;
    let status = status.advance_to(TaskStatus::Evaluating).unwrap();
    let status = status.advance_to(TaskStatus::Completed).unwrap();
    assert!(status.is_terminal());
}

#[test]
fn task_can_fail_from_running_or_evaluating() {
    assert!(TaskStatus::Running.can_advance_to(TaskStatus::Failed));
    assert!(TaskStatus::Evaluating.can_advance_to(TaskStatus::Failed));
}

#[test]
fn task_never_regresses_to_running() {
    assert!(!TaskStatus::Evaluating.can_advance_to(TaskStatus::Running));
    assert!(!TaskStatus::Completed.can_advance_to(TaskStatus::Running));
    assert!(!TaskStatus::Failed.can_advance_to(TaskStatus::Running));
}

#[test]
fn illegal_transition_reports_both_ends() {
    let err = TaskStatus::Completed
        .advance_to(TaskStatus::Evaluating)
        .unwrap_err();
    assert_eq!(err.from, "completed");
    assert_eq!(err.to, "evaluating");
}

#[test]
fn statuses_serialize_as_lowercase_strings() {
    assert_eq!(
        serde_json::to_string(&JobStatus::Starting).unwrap(),
        "\"starting\""
    );
    assert_eq!(
        serde_json::to_string(&TaskStatus::Evaluating).unwrap(),
        "\"evaluating\""
    );
    let status: TaskStatus = serde_json::from_str("\"failed\"").unwrap();
    assert_eq!(status, TaskStatus::Failed);
}
