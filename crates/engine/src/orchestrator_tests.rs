// SPDX-License-Identifier: MIT

use super::*;
use crate::testing::{FakeClassifier, FakeRunner, FakeRunnerLoader};
use serde_json::json;
use tempfile::{tempdir, TempDir};
use xb_core::{FakeClock, SequentialIdGen};

type TestStore = Store<FakeClock, SequentialIdGen>;

struct Fixture {
    store: TestStore,
    runner: FakeRunner,
    folder: TempDir,
}

impl Fixture {
    fn new(config: &str) -> Self {
        let folder = tempdir().unwrap();
        let xb = folder.path().join(".xb");
        std::fs::create_dir_all(&xb).unwrap();
        std::fs::write(xb.join("config.toml"), config).unwrap();

        let store = Store::open_with(
            &folder.path().join("state.log"),
            FakeClock::new(),
            SequentialIdGen::new("id"),
        )
        .unwrap();
        Self {
            store,
            runner: FakeRunner::new(),
            folder,
        }
    }

    fn orchestrator(&self, classifier: FakeClassifier) -> Orchestrator<FakeClock, SequentialIdGen> {
        Orchestrator::new(
            self.store.clone(),
            Arc::new(FakeRunnerLoader::new(self.runner.clone())),
            Arc::new(classifier),
        )
    }

    async fn run(&self, classifier: FakeClassifier) -> String {
        let job_id = self.store.start_job("proj").unwrap();
        self.orchestrator(classifier)
            .run_job(&job_id, self.folder.path())
            .await;
        job_id
    }
}

const THREE_PASSING: &str = r#"
[project]
id = "proj"

[[task]]
id = "alpha"
[task.params]
output = "one"
[task.eval]
checklist = ["does the thing"]
min_score = 0.5

[[task]]
id = "beta"
[task.params]
output = "two"
[task.eval]
checklist = ["does the thing"]
min_score = 0.5

[[task]]
id = "gamma"
[task.params]
output = "three"
[task.eval]
checklist = ["does the thing"]
min_score = 0.5
"#;

#[tokio::test]
async fn all_tasks_pass_and_the_job_completes() {
    let fixture = Fixture::new(THREE_PASSING);
    let job_id = fixture.run(FakeClassifier::scoring(1.0)).await;

    let job = fixture.store.find_job(&job_id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.finished_at.is_some());
    assert_eq!(job.total_tasks, 3);

    let tasks = fixture.store.list_tasks(&job_id);
    assert_eq!(tasks.len(), 3);
    assert!(tasks.iter().all(|t| t.status == TaskStatus::Completed));
    assert!(tasks.iter().all(|t| t.eval_passed == Some(true)));

    // Declaration order, 1-based ordinals
    let challenges: Vec<&str> = tasks.iter().map(|t| t.challenge_id.as_str()).collect();
    assert_eq!(challenges, ["alpha", "beta", "gamma"]);
    assert_eq!(tasks[2].ordinal, 3);
}

#[tokio::test]
async fn completed_payload_carries_results_and_status_map() {
    let fixture = Fixture::new(THREE_PASSING);
    let job_id = fixture.run(FakeClassifier::scoring(1.0)).await;

    let job = fixture.store.find_job(&job_id).unwrap();
    assert_eq!(job.details["status"], "completed");
    assert_eq!(job.details["results"].as_array().unwrap().len(), 3);
    let status_map = job.details["status_map"].as_object().unwrap();
    assert_eq!(status_map.len(), 3);
    assert!(status_map.values().all(|v| v == "completed"));
}

#[tokio::test]
async fn one_failing_task_does_not_stop_the_rest() {
    // Task two raises "boom"; one and three succeed
    let config = r#"
[project]
id = "proj"

[[task]]
id = "one"
[task.params]
output = "ok"
[task.eval]
checklist = ["works"]
min_score = 0.5

[[task]]
id = "two"
[task.params]
fail = "boom"

[[task]]
id = "three"
[task.params]
output = "ok"
[task.eval]
checklist = ["works"]
min_score = 0.5
"#;
    let fixture = Fixture::new(config);
    let job_id = fixture.run(FakeClassifier::scoring(1.0)).await;

    // The loop still completes
    let job = fixture.store.find_job(&job_id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);

    let tasks = fixture.store.list_tasks(&job_id);
    assert_eq!(tasks[0].status, TaskStatus::Completed);
    assert_eq!(tasks[1].status, TaskStatus::Failed);
    assert_eq!(tasks[1].error.as_deref(), Some("runner failed: boom"));
    assert_eq!(tasks[2].status, TaskStatus::Completed);

    let results = job.details["results"].as_array().unwrap();
    assert!(results[1]["error"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn missing_config_fails_the_job_with_no_tasks() {
    let folder = tempdir().unwrap();
    let store: TestStore = Store::open_with(
        &folder.path().join("state.log"),
        FakeClock::new(),
        SequentialIdGen::new("id"),
    )
    .unwrap();
    let orchestrator = Orchestrator::new(
        store.clone(),
        Arc::new(FakeRunnerLoader::new(FakeRunner::new())),
        Arc::new(FakeClassifier::scoring(1.0)),
    );

    let job_id = store.start_job("proj").unwrap();
    orchestrator.run_job(&job_id, folder.path()).await;

    let job = store.find_job(&job_id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.details["error"]
        .as_str()
        .unwrap()
        .contains("config file not found"));
    assert!(store.list_tasks(&job_id).is_empty());
}

#[tokio::test]
async fn missing_runner_entry_point_is_fatal() {
    let fixture = Fixture::new(THREE_PASSING);
    let orchestrator = Orchestrator::new(
        fixture.store.clone(),
        Arc::new(FakeRunnerLoader::absent()),
        Arc::new(FakeClassifier::scoring(1.0)),
    );

    let job_id = fixture.store.start_job("proj").unwrap();
    orchestrator.run_job(&job_id, fixture.folder.path()).await;

    let job = fixture.store.find_job(&job_id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.details["error"]
        .as_str()
        .unwrap()
        .contains("entry point not found"));
    assert!(fixture.store.list_tasks(&job_id).is_empty());
}

#[tokio::test]
async fn evaluation_failure_is_isolated_to_the_task() {
    let fixture = Fixture::new(THREE_PASSING);
    let job_id = fixture.run(FakeClassifier::failing("endpoint down")).await;

    let job = fixture.store.find_job(&job_id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);

    let tasks = fixture.store.list_tasks(&job_id);
    assert_eq!(tasks.len(), 3);
    for task in &tasks {
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.as_deref().unwrap().contains("endpoint down"));
        // Execution succeeded before the gate rejected
        assert!(task.executed_at.is_some());
    }
}

#[tokio::test]
async fn unsupported_eval_kind_fails_only_that_task() {
    let config = r#"
[project]
id = "proj"

[[task]]
id = "one"
[task.params]
output = "ok"
[task.eval]
regex = "^ok$"

[[task]]
id = "two"
[task.params]
output = "ok"
[task.eval]
checklist = ["works"]
min_score = 0.5
"#;
    let fixture = Fixture::new(config);
    let job_id = fixture.run(FakeClassifier::scoring(1.0)).await;

    let tasks = fixture.store.list_tasks(&job_id);
    assert_eq!(tasks[0].status, TaskStatus::Failed);
    assert!(tasks[0]
        .error
        .as_deref()
        .unwrap()
        .contains("no supported evaluator"));
    assert_eq!(tasks[1].status, TaskStatus::Completed);
}

#[tokio::test]
async fn task_without_eval_completes_unevaluated() {
    let config = r#"
[project]
id = "proj"

[[task]]
id = "plain"
[task.params]
output = "ok"
"#;
    let fixture = Fixture::new(config);
    let job_id = fixture.run(FakeClassifier::scoring(0.0)).await;

    let tasks = fixture.store.list_tasks(&job_id);
    assert_eq!(tasks[0].status, TaskStatus::Completed);
    assert_eq!(tasks[0].eval_passed, None);
}

#[tokio::test]
async fn boundary_score_passes_the_threshold() {
    let config = r#"
[project]
id = "proj"

[[task]]
id = "edge"
[task.params]
output = "ok"
[task.eval]
checklist = ["works"]
min_score = 0.6
"#;
    let fixture = Fixture::new(config);
    let job_id = fixture.run(FakeClassifier::scoring(0.6)).await;

    let task = &fixture.store.list_tasks(&job_id)[0];
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.eval_passed, Some(true));
    assert_eq!(task.eval_score, Some(0.6));
}

#[tokio::test]
async fn certain_fault_injection_fails_every_task() {
    let config = r#"
[project]
id = "proj"

[meta]
fail_simulate = 1.0

[[task]]
id = "one"
[task.params]
output = "ok"

[[task]]
id = "two"
[task.params]
output = "ok"
"#;
    let fixture = Fixture::new(config);
    let job_id = fixture.run(FakeClassifier::scoring(1.0)).await;

    let tasks = fixture.store.list_tasks(&job_id);
    assert_eq!(tasks.len(), 2);
    for task in &tasks {
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.as_deref().unwrap().contains("simulated"));
    }
    // The runner was never invoked
    assert!(fixture.runner.calls().is_empty());
}

#[tokio::test]
async fn runner_receives_declared_params_in_order() {
    let fixture = Fixture::new(THREE_PASSING);
    fixture.run(FakeClassifier::scoring(1.0)).await;

    let calls = fixture.runner.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0]["output"], json!("one"));
    assert_eq!(calls[2]["output"], json!("three"));
}

#[tokio::test]
async fn model_attribution_is_captured_from_runner_details() {
    let config = r#"
[project]
id = "proj"

[[task]]
id = "one"
[task.params]
output = "ok"
model = "gpt-4o"
"#;
    let fixture = Fixture::new(config);
    let job_id = fixture.run(FakeClassifier::scoring(1.0)).await;

    let task = &fixture.store.list_tasks(&job_id)[0];
    assert_eq!(task.task_details["model"], "gpt-4o");
}

#[test]
fn status_map_folding_only_rewrites_unresolved_entries() {
    let mut map = BTreeMap::new();
    map.insert("t1".to_string(), TaskStatus::Completed);
    map.insert("t2".to_string(), TaskStatus::Running);
    map.insert("t3".to_string(), TaskStatus::Evaluating);
    map.insert("t4".to_string(), TaskStatus::Failed);

    mark_unresolved_failed(&mut map);

    assert_eq!(map["t1"], TaskStatus::Completed);
    assert_eq!(map["t2"], TaskStatus::Failed);
    assert_eq!(map["t3"], TaskStatus::Failed);
    assert_eq!(map["t4"], TaskStatus::Failed);
}

#[test]
fn job_failure_reports_unresolved_tasks_without_rewriting_rows() {
    let fixture = Fixture::new(THREE_PASSING);
    let job_id = fixture.store.start_job("proj").unwrap();
    fixture
        .store
        .update_job(&job_id, JobStatus::Running, 2, Some(2), None)
        .unwrap();

    let done = fixture.store.start_task(&job_id, "alpha", 1).unwrap();
    fixture
        .store
        .task_executed(&done, json!({}), json!("out"), json!({}), None)
        .unwrap();
    fixture
        .store
        .task_evaluated(&done, json!({}), true, 1.0, json!({}), None)
        .unwrap();
    let stuck = fixture.store.start_task(&job_id, "beta", 2).unwrap();

    let error = JobError::from(StoreError::JobNotFound("proj".to_string()));
    fixture
        .orchestrator(FakeClassifier::scoring(1.0))
        .finalize_failed(&job_id, &error);

    let job = fixture.store.find_job(&job_id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.finished_at.is_some());
    let status_map = job.details["status_map"].as_object().unwrap();
    assert_eq!(status_map[done.as_str()], "completed");
    assert_eq!(status_map[stuck.as_str()], "failed");

    // The task row keeps the state it actually reached
    assert_eq!(
        fixture.store.find_task(&stuck).unwrap().status,
        TaskStatus::Running
    );
}
