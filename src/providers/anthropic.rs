use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::json;

use crate::client::ChatMessage;
use crate::config::{DEFAULT_ANTHROPIC_BASE_URL, ProviderType};
use crate::pipeline::GenerationPort;

use super::chat::{ChatCompletionModel, ModelOptions, resolve_api_key};

pub const DEFAULT_THINKING_BUDGET_TOKENS: u32 = 2048;

/// Claude through Anthropic's OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct ClaudeModel {
    inner: ChatCompletionModel,
}

impl ClaudeModel {
    pub fn new(options: ModelOptions) -> Result<Self> {
        let api_key = resolve_api_key(ProviderType::Anthropic, options.api_key.clone())
            .ok_or_else(|| {
                anyhow!("Anthropic API key is required. Get one from https://console.anthropic.com/")
            })?;
        let base_url = options
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string());

        let inner =
            ChatCompletionModel::connect(ProviderType::Anthropic, options, Some(api_key), &base_url)?;
        Ok(Self { inner })
    }

    /// Toggles extended thinking for every subsequent request.
    pub fn with_thinking(mut self, enabled: bool) -> Self {
        if enabled {
            self.inner.set_param(
                "thinking",
                json!({ "type": "enabled", "budget_tokens": DEFAULT_THINKING_BUDGET_TOKENS }),
            );
        } else {
            self.inner.remove_param("thinking");
        }
        self
    }

    pub fn thinking_enabled(&self) -> bool {
        self.inner.param("thinking").is_some()
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }
}

#[async_trait]
impl GenerationPort for ClaudeModel {
    async fn generate(&self, conversation: &[ChatMessage]) -> Result<String> {
        self.inner.complete(conversation).await
    }
}
