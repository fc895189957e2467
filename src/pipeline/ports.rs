use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::client::ChatMessage;

use super::outcome::Evaluation;

/// Anything that can turn a conversation into a model response.
///
/// Implementations must tolerate repeated, independent calls; the pipeline
/// encodes all state it needs into the conversation it passes in.
#[async_trait]
pub trait GenerationPort: Send + Sync {
    async fn generate(&self, conversation: &[ChatMessage]) -> Result<String>;
}

/// Raw grade produced by an evaluation port, before the pass threshold is
/// applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub score: f64,
    pub feedback: String,
}

impl Grade {
    pub fn new(score: f64, feedback: impl Into<String>) -> Self {
        Self {
            score,
            feedback: feedback.into(),
        }
    }

    /// Scores exactly at the threshold pass.
    pub fn judge(self, pass_threshold: f64) -> Evaluation {
        Evaluation {
            passed: self.score >= pass_threshold,
            score: self.score,
            feedback: self.feedback,
        }
    }
}

/// Grades a candidate output against the prompt that produced it.
#[async_trait]
pub trait EvaluationPort: Send + Sync {
    async fn evaluate(&self, prompt: &str, candidate: &str) -> Result<Grade>;
}

/// Synchronous check run on the original prompt before any port call.
pub trait InputGuardrail: Send + Sync {
    fn check(&self, prompt: &str) -> std::result::Result<(), String>;
}

impl<F> InputGuardrail for F
where
    F: Fn(&str) -> std::result::Result<(), String> + Send + Sync,
{
    fn check(&self, prompt: &str) -> std::result::Result<(), String> {
        self(prompt)
    }
}

#[async_trait]
impl<T> GenerationPort for Arc<T>
where
    T: GenerationPort + ?Sized,
{
    async fn generate(&self, conversation: &[ChatMessage]) -> Result<String> {
        (**self).generate(conversation).await
    }
}

#[async_trait]
impl<T> EvaluationPort for Arc<T>
where
    T: EvaluationPort + ?Sized,
{
    async fn evaluate(&self, prompt: &str, candidate: &str) -> Result<Grade> {
        (**self).evaluate(prompt, candidate).await
    }
}
