use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::client::ChatMessage;
use crate::config::{DEFAULT_OPENAI_BASE_URL, ProviderType};
use crate::pipeline::GenerationPort;

use super::chat::{ChatCompletionModel, ModelOptions, resolve_api_key};

#[derive(Debug, Clone)]
pub struct OpenAIModel {
    inner: ChatCompletionModel,
}

impl OpenAIModel {
    pub fn new(options: ModelOptions) -> Result<Self> {
        let api_key = resolve_api_key(ProviderType::OpenAI, options.api_key.clone())
            .ok_or_else(|| anyhow!("OpenAI API key is required. Set OPENAI_API_KEY."))?;
        let base_url = options
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        let inner =
            ChatCompletionModel::connect(ProviderType::OpenAI, options, Some(api_key), &base_url)?;
        Ok(Self { inner })
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }
}

#[async_trait]
impl GenerationPort for OpenAIModel {
    async fn generate(&self, conversation: &[ChatMessage]) -> Result<String> {
        self.inner.complete(conversation).await
    }
}
