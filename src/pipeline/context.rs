use std::sync::Arc;

use super::error::PipelineError;
use super::outcome::{Attempt, Evaluation, EvaluationResult};
use super::policy::Decision;
use super::trace::{PipelineEvent, TraceSink};
use super::types::{Phase, RunStatus};

/// Ordered attempt history of a single `run` invocation.
///
/// Owned by the run that created it; converted into an [`EvaluationResult`]
/// or a [`PipelineError`] when the run terminates.
pub(crate) struct Run {
    attempts: Vec<Attempt>,
    sink: Arc<dyn TraceSink>,
}

impl Run {
    pub(crate) fn new(sink: Arc<dyn TraceSink>) -> Self {
        Self {
            attempts: Vec::new(),
            sink,
        }
    }

    pub(crate) fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub(crate) fn next_index(&self) -> usize {
        self.attempts.len()
    }

    pub(crate) fn record_attempt_start(&self, prompt: &str) {
        self.sink.record(&PipelineEvent::AttemptStarted {
            attempt: self.next_index(),
            prompt: prompt.to_string(),
        });
    }

    pub(crate) fn record_evaluation(&self, evaluation: Option<&Evaluation>, error: Option<String>) {
        self.sink.record(&PipelineEvent::AttemptEvaluated {
            attempt: self.next_index(),
            evaluation: evaluation.cloned(),
            error,
        });
    }

    pub(crate) fn push(&mut self, attempt: Attempt) {
        debug_assert_eq!(attempt.index, self.attempts.len());
        self.attempts.push(attempt);
    }

    pub(crate) fn record_decision(&self, decision: &Decision) {
        let attempt = self.attempts.len().saturating_sub(1);
        self.sink.record(&PipelineEvent::AttemptDecided {
            attempt,
            decision: decision.clone(),
        });
    }

    fn terminate(&self, status: RunStatus) {
        self.sink.record(&PipelineEvent::RunTerminated {
            status,
            attempts: self.attempts.len(),
        });
    }

    pub(crate) fn finish(self, status: RunStatus, evaluator_configured: bool) -> EvaluationResult {
        self.terminate(status);

        let Run { attempts, .. } = self;
        let last = attempts.last();
        let output = last.map(|attempt| attempt.raw_output.clone()).unwrap_or_default();
        let final_score = last.and_then(Attempt::score);
        let passed = status == RunStatus::Accepted
            && (!evaluator_configured || last.is_some_and(Attempt::passed));

        EvaluationResult {
            output,
            passed,
            final_score,
            history: attempts,
            status,
        }
    }

    pub(crate) fn generation_failed(self, source: anyhow::Error) -> PipelineError {
        self.terminate(RunStatus::Aborted);
        PipelineError::Generation {
            attempt: self.attempts.len(),
            source,
            history: self.attempts,
        }
    }

    pub(crate) fn cancelled(self, phase: Phase) -> PipelineError {
        self.terminate(RunStatus::Aborted);
        PipelineError::Cancelled {
            phase,
            history: self.attempts,
        }
    }
}
