use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{AIClient, ChatCompletionRequest, ChatMessage};
use crate::config::{DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS, LlmSettings, ProviderType};
use crate::pipeline::GenerationPort;

use super::budget::completion_budget;

/// Adapter configuration shared by every provider.
#[derive(Debug, Clone, Default)]
pub struct ModelOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Context window used to size the completion budget.
    pub max_tokens: Option<u32>,
    /// Sent as the `User-Agent` header; defaults to the crate name and version.
    pub user_agent: Option<String>,
    /// Extra parameters sent with every request.
    pub extra: Map<String, Value>,
}

impl ModelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &LlmSettings, model: &str, max_tokens: u32) -> Self {
        Self {
            model: Some(model.to_string()),
            temperature: Some(settings.temperature),
            api_key: Some(settings.api_key.clone()),
            base_url: Some(settings.base_url.clone()),
            timeout_secs: Some(settings.timeout_secs),
            max_tokens: Some(max_tokens),
            user_agent: Some(settings.user_agent.clone()),
            extra: Map::new(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// An explicit, non-blank key wins over the provider's environment variable.
pub(crate) fn resolve_api_key(provider: ProviderType, explicit: Option<String>) -> Option<String> {
    let from_env = provider
        .api_key_env_var()
        .and_then(|var| std::env::var(var).ok());
    pick_api_key(explicit, from_env)
}

pub(crate) fn pick_api_key(explicit: Option<String>, from_env: Option<String>) -> Option<String> {
    explicit
        .filter(|key| !key.trim().is_empty())
        .or(from_env.filter(|key| !key.trim().is_empty()))
        .map(|key| key.trim().to_string())
}

/// One model behind an OpenAI-compatible endpoint. Provider adapters wrap it.
#[derive(Debug, Clone)]
pub struct ChatCompletionModel {
    client: AIClient,
    model: String,
    temperature: f32,
    context_limit: Option<u32>,
    extra: Map<String, Value>,
}

impl ChatCompletionModel {
    pub(crate) fn connect(
        provider: ProviderType,
        options: ModelOptions,
        api_key: Option<String>,
        base_url: &str,
    ) -> Result<Self> {
        let mut client = AIClient::with_endpoint(
            provider,
            base_url,
            api_key,
            options.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        )?;
        if let Some(user_agent) = options.user_agent.filter(|agent| !agent.trim().is_empty()) {
            client = client.with_user_agent(user_agent);
        }
        let model = options
            .model
            .unwrap_or_else(|| provider.default_model().to_string());

        debug!(provider = %provider, model = model.as_str(), base_url, "model adapter ready");

        Ok(Self {
            client,
            model,
            temperature: options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            context_limit: options.max_tokens,
            extra: options.extra,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn provider(&self) -> ProviderType {
        self.client.provider()
    }

    pub(crate) fn set_param(&mut self, key: &str, value: Value) {
        self.extra.insert(key.to_string(), value);
    }

    pub(crate) fn remove_param(&mut self, key: &str) {
        self.extra.remove(key);
    }

    pub(crate) fn param(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub async fn complete(&self, conversation: &[ChatMessage]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: conversation.to_vec(),
            max_tokens: self
                .context_limit
                .map(|limit| completion_budget(limit, conversation)),
            temperature: Some(self.temperature),
            extra: self.extra.clone(),
        };

        let content = self.client.chat_completion(request).await?.into_content()?;
        debug!(
            model = self.model.as_str(),
            chars = content.len(),
            "chat completion received"
        );
        Ok(content)
    }
}

#[async_trait]
impl GenerationPort for ChatCompletionModel {
    async fn generate(&self, conversation: &[ChatMessage]) -> Result<String> {
        self.complete(conversation).await
    }
}
