use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use super::parsing::{extract_json_object, normalize_score, parse_grade};
use super::*;
use crate::client::{ChatMessage, ChatMessageRole};
use crate::pipeline::{AgentPipeline, RunStatus};

/// Replays canned model responses and records every conversation it sees.
struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    fn new(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl GenerationPort for ScriptedModel {
    async fn generate(&self, conversation: &[ChatMessage]) -> Result<String> {
        self.seen.lock().unwrap().push(conversation.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("script exhausted"))
    }
}

#[test]
fn extracts_object_after_think_block() {
    let raw = "<think>maybe {\"score\": 0.1}</think>\n{\"score\": 0.9, \"feedback\": \"ok\"} trailing";
    assert_eq!(
        extract_json_object(raw).as_deref(),
        Some("{\"score\": 0.9, \"feedback\": \"ok\"}")
    );
}

#[test]
fn unterminated_think_block_hides_everything_after_it() {
    assert_eq!(extract_json_object("<think>{\"score\": 1}"), None);
}

#[test]
fn braces_inside_strings_do_not_end_the_object() {
    let raw = r#"{"score": 0.5, "feedback": "close the } and add \"{\""}"#;
    assert_eq!(extract_json_object(raw).as_deref(), Some(raw));
}

#[test]
fn scores_are_normalized_into_unit_range() {
    assert_eq!(normalize_score(0.42), Some(0.42));
    assert_eq!(normalize_score(85.0), Some(0.85));
    assert_eq!(normalize_score(250.0), Some(1.0));
    assert_eq!(normalize_score(-0.3), Some(0.0));
    assert_eq!(normalize_score(f64::NAN), None);
}

#[test]
fn parse_grade_accepts_numeric_strings_and_missing_feedback() {
    let grade = parse_grade(r#"{"score": "70%"}"#).unwrap();
    assert!((grade.score - 0.7).abs() < 1e-9);
    assert_eq!(grade.feedback, "");
}

#[test]
fn parse_grade_rejects_prose_and_bad_scores() {
    let err = parse_grade("looks good to me").unwrap_err().to_string();
    assert!(err.contains("did not contain JSON"), "{err}");

    let err = parse_grade(r#"{"score": "high"}"#).unwrap_err().to_string();
    assert!(err.contains("not a number"), "{err}");

    assert!(parse_grade(r#"{"feedback": "no score"}"#).is_err());
}

#[tokio::test]
async fn model_evaluator_sends_criteria_task_and_response() {
    let judge = ScriptedModel::new(&[r#"{"score": 0.8, "feedback": " tighten the ending "}"#]);
    let evaluator = ModelEvaluator::new(judge.clone()).with_instructions("Must rhyme.");

    let grade = evaluator.evaluate("Write a couplet", "Roses are red").await.unwrap();

    assert_eq!(grade, Grade::new(0.8, "tighten the ending"));

    let seen = judge.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let conversation = &seen[0];
    assert_eq!(conversation[0].role, ChatMessageRole::System);
    assert_eq!(conversation[1].role, ChatMessageRole::User);
    assert!(conversation[1].content.contains("CRITERIA:\nMust rhyme."));
    assert!(conversation[1].content.contains("TASK:\nWrite a couplet"));
    assert!(conversation[1].content.contains("RESPONSE:\nRoses are red"));
}

#[tokio::test]
async fn model_evaluator_reports_unparseable_output() {
    let judge = ScriptedModel::new(&["I would give it a B+"]);
    let evaluator = ModelEvaluator::new(judge);

    assert!(evaluator.evaluate("task", "answer").await.is_err());
    assert_eq!(evaluator.instructions(), DEFAULT_EVALUATION_INSTRUCTIONS);
}

#[tokio::test]
async fn model_evaluator_propagates_judge_failure() {
    let judge = ScriptedModel::new(&[]);
    let evaluator = ModelEvaluator::new(judge);

    let err = evaluator.evaluate("task", "answer").await.unwrap_err();
    assert!(format!("{err:#}").contains("Evaluator model call failed"));
}

#[tokio::test]
async fn rule_evaluator_applies_closure() {
    let evaluator = RuleEvaluator::new(|prompt: &str, candidate: &str| {
        if candidate.contains(prompt) {
            Grade::new(1.0, "")
        } else {
            Grade::new(0.0, format!("mention {prompt}"))
        }
    });

    assert_eq!(evaluator.evaluate("ferris", "hi ferris").await.unwrap().score, 1.0);
    let grade = evaluator.evaluate("ferris", "hi crab").await.unwrap();
    assert_eq!(grade.score, 0.0);
    assert_eq!(grade.feedback, "mention ferris");
}

#[tokio::test]
async fn pipeline_retries_until_model_judge_passes() {
    let writer = ScriptedModel::new(&["draft one", "draft two"]);
    let judge = ScriptedModel::new(&[
        r#"{"score": 40, "feedback": "add detail"}"#,
        r#"<think>better</think>{"score": 0.9, "feedback": ""}"#,
    ]);

    let pipeline = AgentPipeline::builder()
        .shared_generator(writer.clone())
        .evaluator(ModelEvaluator::new(judge))
        .max_attempts(3)
        .pass_threshold(0.85)
        .build();

    let result = pipeline.run("Describe a crab").await.unwrap();

    assert_eq!(result.status, RunStatus::Accepted);
    assert!(result.passed);
    assert_eq!(result.output, "draft two");
    assert_eq!(result.attempts(), 2);
    assert_eq!(result.history[0].score(), Some(0.4));

    let seen = writer.seen.lock().unwrap();
    let retry_prompt = &seen[1].last().unwrap().content;
    assert!(retry_prompt.contains("add detail"), "{retry_prompt}");
}
