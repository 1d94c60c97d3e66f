// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn choice_scores_are_normalized() {
    assert_eq!(choice_score('A'), Some(0.4));
    assert_eq!(choice_score('B'), Some(0.6));
    assert_eq!(choice_score('C'), Some(1.0));
    assert_eq!(choice_score('D'), Some(0.0));
    assert_eq!(choice_score('E'), None);
}

#[test]
fn parse_verdict_finds_the_letter() {
    assert_eq!(parse_verdict("C").unwrap(), 'C');
    assert_eq!(parse_verdict("  b\n").unwrap(), 'B');
    assert_eq!(parse_verdict("Answer: A").unwrap(), 'A');
}

#[test]
fn parse_verdict_rejects_unknown_answers() {
    assert!(parse_verdict("42").is_err());
    assert!(parse_verdict("").is_err());
    // First letter wins, even when it is not a grade
    assert!(parse_verdict("X").is_err());
}

#[test]
fn prompt_carries_question_requirement_and_submission() {
    let prompt = render_prompt("say hello", "greets the user", "hello there").unwrap();
    assert!(prompt.contains("say hello"));
    assert!(prompt.contains("greets the user"));
    assert!(prompt.contains("hello there"));
    assert!(prompt.contains("single letter"));
}
