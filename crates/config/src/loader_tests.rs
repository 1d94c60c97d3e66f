// SPDX-License-Identifier: MIT

use super::*;
use crate::parser::parse_config;
use serde_json::json;

fn load(toml: &str) -> Result<ProjectConfig, LoadError> {
    load_config(&parse_config(toml).unwrap())
}

const MINIMAL: &str = r#"
[project]
id = "demo"

[[task]]
[task.params]
prompt = "Say hello"
"#;

#[test]
fn minimal_config_loads_with_defaults() {
    let config = load(MINIMAL).unwrap();
    assert_eq!(config.project.id, "demo");
    // Name defaults to the id, description to empty
    assert_eq!(config.project.name, "demo");
    assert_eq!(config.project.description, "");
    assert_eq!(config.fail_simulate, None);

    assert_eq!(config.tasks.len(), 1);
    let task = &config.tasks[0];
    assert_eq!(task.challenge_id, "task-1");
    assert_eq!(task.params, json!({"prompt": "Say hello"}));
    assert!(task.eval.is_none());
}

#[test]
fn explicit_challenge_ids_are_kept() {
    let config = load(
        r#"
[project]
id = "demo"

[[task]]
id = "greeting"
[[task]]
"#,
    )
    .unwrap();
    assert_eq!(config.tasks[0].challenge_id, "greeting");
    assert_eq!(config.tasks[1].challenge_id, "task-2");
}

#[test]
fn duplicate_challenge_ids_are_rejected() {
    let err = load(
        r#"
[project]
id = "demo"

[[task]]
id = "same"
[[task]]
id = "same"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::DuplicateChallenge { id } if id == "same"));
}

#[test]
fn eval_defaults_min_score_to_one() {
    let config = load(
        r#"
[project]
id = "demo"

[[task]]
[task.eval]
checklist = ["says hello"]
"#,
    )
    .unwrap();
    let eval = config.tasks[0].eval.as_ref().unwrap();
    assert_eq!(eval.min_score, 1.0);
    assert_eq!(eval.checklist.as_ref().unwrap().len(), 1);
    assert!(eval.other_kinds.is_empty());
}

#[test]
fn unsupported_eval_kinds_survive_loading() {
    // Loading must not fail: the unsupported kind is a per-task
    // evaluation error, not a configuration error.
    let config = load(
        r#"
[project]
id = "demo"

[[task]]
[task.eval]
rubric = "grader-x"
"#,
    )
    .unwrap();
    let eval = config.tasks[0].eval.as_ref().unwrap();
    assert!(eval.checklist.is_none());
    assert_eq!(eval.other_kinds, vec!["rubric".to_string()]);
}

#[test]
fn min_score_out_of_range_is_rejected() {
    let err = load(
        r#"
[project]
id = "demo"

[[task]]
[task.eval]
min_score = 1.5
"#,
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::InvalidValue { .. }));
}

#[test]
fn fail_simulate_must_be_probability() {
    let err = load(
        r#"
[project]
id = "demo"

[meta]
fail_simulate = 2.0
"#,
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::InvalidValue { .. }));
}

#[test]
fn missing_project_block_is_rejected() {
    let err = load("[[task]]").unwrap_err();
    assert!(matches!(err, LoadError::MissingField { field: "project", .. }));
}

#[test]
fn eval_spec_serializes_for_persistence() {
    let spec = EvalSpec {
        checklist: Some(vec!["a".to_string()]),
        min_score: 0.6,
        other_kinds: vec![],
    };
    assert_eq!(spec.to_value(), json!({"checklist": ["a"], "min_score": 0.6}));
}

#[test]
fn load_project_config_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_project_config(dir.path()).unwrap_err();
    assert!(matches!(err, LoadError::Missing { .. }));
}

#[test]
fn load_project_config_reads_dot_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join(crate::CONFIG_DIR);
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join(crate::CONFIG_FILE), MINIMAL).unwrap();

    let config = load_project_config(dir.path()).unwrap();
    assert_eq!(config.project.id, "demo");
    assert_eq!(config.tasks.len(), 1);
}
