use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::client::ChatMessage;
use crate::config::{DEFAULT_GOOGLE_BASE_URL, ProviderType};
use crate::pipeline::GenerationPort;

use super::chat::{ChatCompletionModel, ModelOptions, resolve_api_key};

/// Gemini through Google's OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    inner: ChatCompletionModel,
}

impl GeminiModel {
    pub fn new(options: ModelOptions) -> Result<Self> {
        let api_key = resolve_api_key(ProviderType::Google, options.api_key.clone())
            .ok_or_else(|| anyhow!("Gemini API key is required. Set GOOGLE_API_KEY."))?;
        let base_url = options
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GOOGLE_BASE_URL.to_string());

        let inner =
            ChatCompletionModel::connect(ProviderType::Google, options, Some(api_key), &base_url)?;
        Ok(Self { inner })
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }
}

#[async_trait]
impl GenerationPort for GeminiModel {
    async fn generate(&self, conversation: &[ChatMessage]) -> Result<String> {
        self.inner.complete(conversation).await
    }
}
