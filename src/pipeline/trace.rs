use std::sync::Mutex;

use tracing::{debug, info, warn};

use super::outcome::Evaluation;
use super::policy::Decision;
use super::types::RunStatus;

/// Structured events emitted on every state transition of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    AttemptStarted {
        attempt: usize,
        prompt: String,
    },
    AttemptEvaluated {
        attempt: usize,
        evaluation: Option<Evaluation>,
        error: Option<String>,
    },
    AttemptDecided {
        attempt: usize,
        decision: Decision,
    },
    RunTerminated {
        status: RunStatus,
        attempts: usize,
    },
}

impl PipelineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::AttemptStarted { .. } => "attempt_started",
            PipelineEvent::AttemptEvaluated { .. } => "attempt_evaluated",
            PipelineEvent::AttemptDecided { .. } => "attempt_decided",
            PipelineEvent::RunTerminated { .. } => "run_terminated",
        }
    }
}

/// Destination for pipeline events. Injected per pipeline.
pub trait TraceSink: Send + Sync {
    fn record(&self, event: &PipelineEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {
    fn record(&self, _event: &PipelineEvent) {}
}

/// Forwards events to the `tracing` subscriber installed by the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&self, event: &PipelineEvent) {
        let name = event.name();
        match event {
            PipelineEvent::AttemptStarted { attempt, prompt } => {
                debug!(event = name, attempt, prompt_len = prompt.len(), "attempt started");
            }
            PipelineEvent::AttemptEvaluated {
                attempt,
                evaluation: Some(evaluation),
                ..
            } => {
                info!(
                    event = name,
                    attempt,
                    score = evaluation.score,
                    passed = evaluation.passed,
                    "attempt evaluated"
                );
            }
            PipelineEvent::AttemptEvaluated {
                attempt,
                evaluation: None,
                error,
            } => {
                warn!(
                    event = name,
                    attempt,
                    error = error.as_deref().unwrap_or("unknown"),
                    "evaluation unavailable"
                );
            }
            PipelineEvent::AttemptDecided { attempt, decision } => {
                info!(event = name, attempt, decision = %decision, "attempt decided");
            }
            PipelineEvent::RunTerminated { status, attempts } => {
                info!(event = name, status = %status, attempts, "run terminated");
            }
        }
    }
}

/// Keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(PipelineEvent::name).collect()
    }
}

impl TraceSink for MemorySink {
    fn record(&self, event: &PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

impl<T> TraceSink for std::sync::Arc<T>
where
    T: TraceSink + ?Sized,
{
    fn record(&self, event: &PipelineEvent) {
        (**self).record(event)
    }
}
