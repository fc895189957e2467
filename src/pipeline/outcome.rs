use serde::Serialize;

use super::types::RunStatus;

/// Grade attached to a single attempt once the evaluation port answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub score: f64,
    pub passed: bool,
    pub feedback: String,
}

/// One generate-(evaluate) cycle. Built once the cycle completes and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attempt {
    pub index: usize,
    pub prompt_used: String,
    pub raw_output: String,
    pub evaluation: Option<Evaluation>,
}

impl Attempt {
    pub fn passed(&self) -> bool {
        self.evaluation.as_ref().is_some_and(|evaluation| evaluation.passed)
    }

    pub fn score(&self) -> Option<f64> {
        self.evaluation.as_ref().map(|evaluation| evaluation.score)
    }
}

/// Terminal result handed back to the caller of [`super::AgentPipeline::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub output: String,
    pub passed: bool,
    pub final_score: Option<f64>,
    pub history: Vec<Attempt>,
    pub status: RunStatus,
}

impl EvaluationResult {
    pub fn attempts(&self) -> usize {
        self.history.len()
    }

    pub fn last_attempt(&self) -> Option<&Attempt> {
        self.history.last()
    }

    pub fn is_accepted(&self) -> bool {
        self.status == RunStatus::Accepted
    }
}
