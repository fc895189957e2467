//! The generate → evaluate → retry orchestration engine.
//!
//! [`AgentPipeline`] drives a [`GenerationPort`], optionally grades each
//! output through an [`EvaluationPort`], and lets a [`RetryPolicy`] decide
//! whether to accept, retry with feedback, or give up.

mod context;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod policy;
pub mod ports;
pub mod prompt;
pub mod trace;
pub mod types;

pub use error::PipelineError;
pub use orchestrator::{
    AgentPipeline, AgentPipelineBuilder, DEFAULT_MAX_ATTEMPTS, DEFAULT_PASS_THRESHOLD,
};
pub use outcome::{Attempt, Evaluation, EvaluationResult};
pub use policy::{Decision, DecisionInput, DefaultRetryPolicy, RetryPolicy};
pub use ports::{EvaluationPort, GenerationPort, Grade, InputGuardrail};
pub use prompt::{DEFAULT_FEEDBACK_TEMPLATE, FeedbackTemplate, next_prompt};
pub use trace::{MemorySink, NoopSink, PipelineEvent, TraceSink, TracingSink};
pub use types::{Phase, RunStatus};
