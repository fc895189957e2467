use thiserror::Error;

use super::outcome::Attempt;
use super::types::{Phase, RunStatus};

/// Failures that keep a run from producing an [`super::EvaluationResult`].
///
/// Evaluation failures and exhausted budgets are not errors; they are folded
/// into the result instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid pipeline configuration: {reason}")]
    Configuration { reason: String },
    #[error("input rejected by guardrail: {reason}")]
    GuardrailRejected { reason: String },
    #[error("generation failed on attempt {attempt}: {source:#}")]
    Generation {
        attempt: usize,
        #[source]
        source: anyhow::Error,
        history: Vec<Attempt>,
    },
    #[error("run cancelled while {phase}")]
    Cancelled { phase: Phase, history: Vec<Attempt> },
}

impl PipelineError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> RunStatus {
        RunStatus::Aborted
    }

    /// Attempts completed before the run aborted.
    pub fn history(&self) -> &[Attempt] {
        match self {
            PipelineError::Generation { history, .. } | PipelineError::Cancelled { history, .. } => {
                history
            }
            PipelineError::Configuration { .. } | PipelineError::GuardrailRejected { .. } => &[],
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, PipelineError::Configuration { .. })
    }
}
