//! Configuration for providers, models and pipeline defaults.
//!
//! Settings are layered in this order:
//! - built-in defaults
//! - the JSON file at `~/.agents-sdk/config`
//! - environment variable overrides
//!
//! A [`ConfigBuilder`] is available for programmatic configuration.

mod builder;
mod constants;
mod defaults;
mod environment;
mod loader;
mod types;
mod validation;

pub use builder::ConfigBuilder;
pub use defaults::default_user_agent;
pub use environment::provider_base_url;
pub use constants::{
    DEFAULT_ANTHROPIC_BASE_URL, DEFAULT_GOOGLE_BASE_URL, DEFAULT_MAX_TOKENS,
    DEFAULT_OLLAMA_BASE_URL, DEFAULT_OPENAI_BASE_URL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};
pub use types::{Config, LlmSettings, ModelSettings, PipelineSettings, ProviderType};

#[cfg(test)]
mod tests;
