use anyhow::Result;
use async_trait::async_trait;

use crate::client::ChatMessage;
use crate::config::{ProviderType, provider_base_url};
use crate::pipeline::GenerationPort;

use super::chat::{ChatCompletionModel, ModelOptions};

/// A model served by a local (or remote) Ollama instance. No API key.
#[derive(Debug, Clone)]
pub struct OllamaModel {
    inner: ChatCompletionModel,
}

impl OllamaModel {
    /// Uses `options.base_url`, then `OLLAMA_BASE_URL` (host only, `/v1` is
    /// appended), then `http://localhost:11434/v1`.
    pub fn new(options: ModelOptions) -> Result<Self> {
        let base_url = match options.base_url.clone() {
            Some(base_url) => base_url,
            None => provider_base_url(ProviderType::Ollama)?,
        };

        let inner = ChatCompletionModel::connect(ProviderType::Ollama, options, None, &base_url)?;
        Ok(Self { inner })
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }
}

#[async_trait]
impl GenerationPort for OllamaModel {
    async fn generate(&self, conversation: &[ChatMessage]) -> Result<String> {
        self.inner.complete(conversation).await
    }
}
