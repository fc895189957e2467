//! Provider-agnostic LLM agents with a generate → evaluate → retry pipeline.
//!
//! ```no_run
//! use agents_sdk_models::pipeline::AgentPipeline;
//! use agents_sdk_models::providers::{ModelOptions, get_llm};
//! use agents_sdk_models::evaluator::ModelEvaluator;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let writer = get_llm(Some("gpt-4o-mini"), None, ModelOptions::new())?;
//! let judge = get_llm(Some("gpt-4o-mini"), None, ModelOptions::new().temperature(0.0))?;
//!
//! let pipeline = AgentPipeline::builder()
//!     .shared_generator(writer)
//!     .evaluator(ModelEvaluator::new(judge))
//!     .max_attempts(3)
//!     .build();
//!
//! let result = pipeline.run("Explain ownership in one paragraph").await?;
//! println!("{} ({:?})", result.output, result.status);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod evaluator;
pub mod pipeline;
pub mod providers;
pub mod telemetry;

pub use evaluator::{ModelEvaluator, RuleEvaluator};
pub use pipeline::{
    AgentPipeline, Attempt, Decision, EvaluationPort, EvaluationResult, GenerationPort, Grade,
    PipelineError, RetryPolicy, RunStatus,
};
pub use providers::{ModelOptions, get_llm};
