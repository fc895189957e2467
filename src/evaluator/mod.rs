//! Ready-made [`EvaluationPort`] implementations.

mod parsing;
mod prompt;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::pipeline::{EvaluationPort, GenerationPort, Grade};

use parsing::parse_grade;
use prompt::judge_conversation;

pub use prompt::DEFAULT_EVALUATION_INSTRUCTIONS;

/// LLM-as-judge: asks a generator to grade the candidate and return
/// `{"score", "feedback"}` JSON.
#[derive(Clone)]
pub struct ModelEvaluator {
    judge: Arc<dyn GenerationPort>,
    instructions: String,
}

impl ModelEvaluator {
    pub fn new(judge: Arc<dyn GenerationPort>) -> Self {
        Self {
            judge,
            instructions: DEFAULT_EVALUATION_INSTRUCTIONS.to_string(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }
}

impl std::fmt::Debug for ModelEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEvaluator")
            .field("instructions", &self.instructions)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EvaluationPort for ModelEvaluator {
    async fn evaluate(&self, prompt: &str, candidate: &str) -> Result<Grade> {
        let conversation = judge_conversation(&self.instructions, prompt, candidate);
        let content = self
            .judge
            .generate(&conversation)
            .await
            .context("Evaluator model call failed")?;

        let grade = parse_grade(&content)?;
        debug!(score = grade.score, "evaluator graded candidate");
        Ok(grade)
    }
}

/// Deterministic evaluator backed by a closure `(prompt, candidate) -> Grade`.
pub struct RuleEvaluator<F> {
    rule: F,
}

impl<F> RuleEvaluator<F>
where
    F: Fn(&str, &str) -> Grade + Send + Sync,
{
    pub fn new(rule: F) -> Self {
        Self { rule }
    }
}

#[async_trait]
impl<F> EvaluationPort for RuleEvaluator<F>
where
    F: Fn(&str, &str) -> Grade + Send + Sync,
{
    async fn evaluate(&self, prompt: &str, candidate: &str) -> Result<Grade> {
        Ok((self.rule)(prompt, candidate))
    }
}

#[cfg(test)]
mod tests;
