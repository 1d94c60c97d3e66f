// SPDX-License-Identifier: MIT

//! Evaluator gate
//!
//! `passed = score >= min_score`; the default threshold of 1.0 means
//! nothing passes unless the classifier assigns a perfect score.

use crate::checklist::{ChecklistRequest, Classifier};
use crate::error::EvaluationError;
use serde_json::Value;
use xb_config::EvalSpec;

/// Outcome of one evaluation
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub score: f64,
    pub passed: bool,
    pub details: Value,
}

/// Evaluate a task's captured input/output against its spec.
///
/// The only supported evaluator kind is the checklist; a spec naming
/// anything else fails with an [`EvaluationError::UnsupportedSpec`],
/// which the orchestrator isolates to that task.
pub async fn evaluate(
    classifier: &dyn Classifier,
    spec: &EvalSpec,
    input: &Value,
    output: &Value,
) -> Result<Evaluation, EvaluationError> {
    let Some(checklist) = spec.checklist.as_deref() else {
        return Err(EvaluationError::UnsupportedSpec {
            kinds: spec.other_kinds.clone(),
        });
    };

    let verdict = classifier
        .grade(ChecklistRequest {
            input,
            checklist,
            output,
        })
        .await?;

    Ok(Evaluation {
        score: verdict.score,
        passed: verdict.score >= spec.min_score,
        details: verdict.details,
    })
}

#[cfg(test)]
#[path = "evaluate_tests.rs"]
mod tests;
