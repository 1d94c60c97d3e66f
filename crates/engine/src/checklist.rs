// SPDX-License-Identifier: MIT

//! Checklist classifier
//!
//! Grades a task's output against enumerated checklist items. Each item
//! gets a four-way letter verdict from an LLM, mapped to a normalized
//! score; the overall score is the item average. The grading prompt is
//! a minijinja template over question/requirement/submission.

use crate::error::EvaluationError;
use async_trait::async_trait;
use minijinja::{context, Environment};
use serde_json::{json, Value};

/// One grading request: the task's captured input and output plus the
/// checklist to grade against
pub struct ChecklistRequest<'a> {
    pub input: &'a Value,
    pub checklist: &'a [String],
    pub output: &'a Value,
}

/// Classifier verdict: normalized score in `[0, 1]` plus free-form
/// grading details for the task row
#[derive(Debug, Clone)]
pub struct Verdict {
    pub score: f64,
    pub details: Value,
}

/// Scores a submission against a checklist
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn grade(&self, request: ChecklistRequest<'_>) -> Result<Verdict, EvaluationError>;
}

const GRADING_PROMPT: &str = "\
Evaluate the following submission against one requirement.

Question:
{{ question }}

Requirement:
{{ requirement }}

Submission:
{{ submission }}

Answer with a single letter:
A - The submission mostly misses the requirement
B - The submission partially meets the requirement
C - The submission fully meets the requirement
D - The submission does not address the requirement at all
";

/// Map a letter verdict to its normalized score
pub(crate) fn choice_score(letter: char) -> Option<f64> {
    match letter {
        'A' => Some(0.4),
        'B' => Some(0.6),
        'C' => Some(1.0),
        'D' => Some(0.0),
        _ => None,
    }
}

/// Extract the letter verdict from a model answer
pub(crate) fn parse_verdict(answer: &str) -> Result<char, EvaluationError> {
    answer
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| choice_score(*c).is_some())
        .ok_or_else(|| EvaluationError::Classifier(format!("unexpected verdict: {answer:?}")))
}

pub(crate) fn render_prompt(
    question: &str,
    requirement: &str,
    submission: &str,
) -> Result<String, EvaluationError> {
    let env = Environment::new();
    let template = env
        .template_from_str(GRADING_PROMPT)
        .map_err(|e| EvaluationError::Classifier(e.to_string()))?;
    template
        .render(context! { question, requirement, submission })
        .map_err(|e| EvaluationError::Classifier(e.to_string()))
}

/// Render a captured value for the prompt: strings verbatim, everything
/// else as JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Checklist classifier backed by an OpenAI-compatible chat endpoint
#[derive(Clone)]
pub struct LlmClassifier {
    endpoint: String,
    api_key: String,
    model: String,
}

impl LlmClassifier {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Blocking chat call; run on the blocking pool
    fn ask(&self, prompt: &str) -> Result<String, EvaluationError> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": 4,
            "temperature": 0,
        });

        let payload = body.to_string();
        let mut response = ureq::post(&self.endpoint)
            .header("authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .send(payload.as_str())
            .map_err(|e| EvaluationError::Classifier(e.to_string()))?;

        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| EvaluationError::Classifier(e.to_string()))?;

        let parsed: Value = serde_json::from_str(&text)
            .map_err(|e| EvaluationError::Classifier(format!("invalid response: {e}")))?;
        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| EvaluationError::Classifier("no completion in response".to_string()))
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn grade(&self, request: ChecklistRequest<'_>) -> Result<Verdict, EvaluationError> {
        let question = value_text(request.input);
        let submission = value_text(request.output);

        let mut evaluations = Vec::with_capacity(request.checklist.len());
        let mut sum = 0.0;
        for item in request.checklist {
            let prompt = render_prompt(&question, item, &submission)?;
            let this = self.clone();
            let answer = tokio::task::spawn_blocking(move || this.ask(&prompt))
                .await
                .map_err(|e| EvaluationError::Classifier(e.to_string()))??;

            let letter = parse_verdict(&answer)?;
            // parse_verdict only accepts graded letters
            let score = choice_score(letter).unwrap_or(0.0);
            tracing::debug!(requirement = %item, verdict = %letter, score, "graded");
            sum += score;
            evaluations.push(json!({
                "requirement": item,
                "verdict": letter.to_string(),
                "score": score,
            }));
        }

        let score = if evaluations.is_empty() {
            0.0
        } else {
            sum / evaluations.len() as f64
        };
        Ok(Verdict {
            score,
            details: json!({ "evaluations": evaluations }),
        })
    }
}

#[cfg(test)]
#[path = "checklist_tests.rs"]
mod tests;
