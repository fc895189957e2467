//! Provider adapters implementing [`GenerationPort`].
//!
//! Every provider is reached through its OpenAI-compatible chat completions
//! endpoint, so the adapters share one request core and differ only in
//! endpoint, credentials and extra parameters.

mod anthropic;
mod budget;
mod chat;
mod gemini;
mod ollama;
mod openai;

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::config::{LlmSettings, ProviderType};
use crate::pipeline::GenerationPort;

pub use anthropic::{ClaudeModel, DEFAULT_THINKING_BUDGET_TOKENS};
pub use budget::{completion_budget, estimate_conversation_tokens, estimate_tokens};
pub use chat::{ChatCompletionModel, ModelOptions};
pub use gemini::GeminiModel;
pub use ollama::OllamaModel;
pub use openai::OpenAIModel;

/// Builds a generator for `model`.
///
/// With no explicit provider the provider is inferred from the model name
/// (`gpt*`/`o1`/`o3`/`o4` → OpenAI, `gemini*` → Google, `claude*` →
/// Anthropic, anything else → Ollama). A missing model falls back to the
/// provider's default, or OpenAI's when neither is given.
pub fn get_llm(
    model: Option<&str>,
    provider: Option<ProviderType>,
    options: ModelOptions,
) -> Result<Arc<dyn GenerationPort>> {
    let provider = provider
        .or_else(|| model.map(ProviderType::infer_from_model))
        .unwrap_or(ProviderType::OpenAI);
    let model = model
        .map(str::to_string)
        .or_else(|| options.model.clone())
        .unwrap_or_else(|| provider.default_model().to_string());

    debug!(provider = %provider, model = model.as_str(), "resolving model adapter");
    build_model(provider, options.model(model), false)
}

/// Builds a generator from loaded settings. The model's own provider wins
/// over the configured one when they disagree, and the configured endpoint
/// and key are then dropped in favour of that provider's defaults.
pub fn from_settings(
    settings: &LlmSettings,
    model: &str,
    max_tokens: u32,
) -> Result<Arc<dyn GenerationPort>> {
    let mut options = ModelOptions::from_settings(settings, model, max_tokens);
    let inferred = ProviderType::infer_from_model(model);

    let provider = if inferred == settings.provider || inferred == ProviderType::Ollama {
        settings.provider
    } else {
        options.api_key = None;
        options.base_url = None;
        inferred
    };

    build_model(provider, options, settings.thinking)
}

fn build_model(
    provider: ProviderType,
    options: ModelOptions,
    thinking: bool,
) -> Result<Arc<dyn GenerationPort>> {
    Ok(match provider {
        ProviderType::OpenAI => Arc::new(OpenAIModel::new(options)?),
        ProviderType::Google => Arc::new(GeminiModel::new(options)?),
        ProviderType::Anthropic => Arc::new(ClaudeModel::new(options)?.with_thinking(thinking)),
        ProviderType::Ollama => Arc::new(OllamaModel::new(options)?),
    })
}
