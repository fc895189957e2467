use anyhow::anyhow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::constants::*;

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub models: ModelSettings,
    pub pipeline: PipelineSettings,
}

impl Config {
    /// Generator model, falling back to the provider's default.
    pub fn generator_model(&self) -> &str {
        self.models
            .generator
            .as_deref()
            .unwrap_or_else(|| self.llm.provider.default_model())
    }

    /// Evaluator model, falling back to the generator model.
    pub fn evaluator_model(&self) -> &str {
        self.models
            .evaluator
            .as_deref()
            .unwrap_or_else(|| self.generator_model())
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: ProviderType,
    pub api_key: String,
    pub timeout_secs: u64,
    pub base_url: String,
    pub user_agent: String,
    pub temperature: f32,
    pub thinking: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    Google,
    Anthropic,
    Ollama,
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderType::OpenAI => write!(f, "openai"),
            ProviderType::Google => write!(f, "google"),
            ProviderType::Anthropic => write!(f, "anthropic"),
            ProviderType::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for ProviderType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderType::OpenAI),
            "google" | "gemini" => Ok(ProviderType::Google),
            "anthropic" | "claude" => Ok(ProviderType::Anthropic),
            "ollama" => Ok(ProviderType::Ollama),
            other => Err(anyhow!("Unknown LLM provider '{other}'")),
        }
    }
}

impl ProviderType {
    pub const ALL: [ProviderType; 4] = [
        ProviderType::OpenAI,
        ProviderType::Google,
        ProviderType::Anthropic,
        ProviderType::Ollama,
    ];

    /// Guess the provider from a model name. Unrecognised names are assumed
    /// to be served by a local Ollama instance.
    pub fn infer_from_model(model: &str) -> Self {
        let model = model.trim().to_ascii_lowercase();
        if model.starts_with("claude") {
            ProviderType::Anthropic
        } else if model.starts_with("gemini") {
            ProviderType::Google
        } else if model.starts_with("gpt")
            || ["o1", "o3", "o4"].iter().any(|prefix| model.starts_with(prefix))
        {
            ProviderType::OpenAI
        } else {
            ProviderType::Ollama
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderType::OpenAI => DEFAULT_OPENAI_BASE_URL,
            ProviderType::Google => DEFAULT_GOOGLE_BASE_URL,
            ProviderType::Anthropic => DEFAULT_ANTHROPIC_BASE_URL,
            ProviderType::Ollama => DEFAULT_OLLAMA_BASE_URL,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderType::OpenAI => DEFAULT_OPENAI_MODEL,
            ProviderType::Google => DEFAULT_GOOGLE_MODEL,
            ProviderType::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            ProviderType::Ollama => DEFAULT_OLLAMA_MODEL,
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    pub fn api_key_env_var(self) -> Option<&'static str> {
        match self {
            ProviderType::OpenAI => Some("OPENAI_API_KEY"),
            ProviderType::Google => Some("GOOGLE_API_KEY"),
            ProviderType::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderType::Ollama => None,
        }
    }

    pub fn requires_api_key(self) -> bool {
        self.api_key_env_var().is_some()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProviderType::OpenAI => "OpenAI",
            ProviderType::Google => "Google Gemini",
            ProviderType::Anthropic => "Anthropic",
            ProviderType::Ollama => "Ollama",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub generator: Option<String>,
    pub evaluator: Option<String>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_attempts: usize,
    pub pass_threshold: f64,
    pub feedback_template: Option<String>,
    pub instructions: Option<String>,
    pub timeout_secs: Option<u64>,
}

// File configuration types
#[derive(Debug, Default, Deserialize)]
pub(super) struct FileConfig {
    #[serde(default)]
    pub llm: Option<FileLlmSettings>,
    #[serde(default)]
    pub models: Option<FileModelSettings>,
    #[serde(default)]
    pub pipeline: Option<FilePipelineSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct FileLlmSettings {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub temperature: Option<f32>,
    pub thinking: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct FileModelSettings {
    pub generator: Option<String>,
    pub evaluator: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct FilePipelineSettings {
    pub max_attempts: Option<usize>,
    pub pass_threshold: Option<f64>,
    pub feedback_template: Option<String>,
    pub instructions: Option<String>,
    pub timeout_secs: Option<u64>,
}

// Serialization helpers
#[derive(Serialize)]
pub(super) struct PersistedConfig<'a> {
    pub llm: PersistedLlm<'a>,
    pub models: PersistedModels<'a>,
    pub pipeline: PersistedPipeline<'a>,
}

#[derive(Serialize)]
pub(super) struct PersistedLlm<'a> {
    pub provider: ProviderType,
    pub api_key: &'a str,
    pub timeout_secs: u64,
    pub base_url: &'a str,
    pub user_agent: &'a str,
    pub temperature: f32,
    pub thinking: bool,
}

#[derive(Serialize)]
pub(super) struct PersistedModels<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluator: Option<&'a str>,
    pub max_tokens: u32,
}

#[derive(Serialize)]
pub(super) struct PersistedPipeline<'a> {
    pub max_attempts: usize,
    pub pass_threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_template: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl<'a> From<&'a Config> for PersistedConfig<'a> {
    fn from(config: &'a Config) -> Self {
        PersistedConfig {
            llm: PersistedLlm {
                provider: config.llm.provider,
                api_key: &config.llm.api_key,
                timeout_secs: config.llm.timeout_secs,
                base_url: &config.llm.base_url,
                user_agent: &config.llm.user_agent,
                temperature: config.llm.temperature,
                thinking: config.llm.thinking,
            },
            models: PersistedModels {
                generator: config.models.generator.as_deref(),
                evaluator: config.models.evaluator.as_deref(),
                max_tokens: config.models.max_tokens,
            },
            pipeline: PersistedPipeline {
                max_attempts: config.pipeline.max_attempts,
                pass_threshold: config.pipeline.pass_threshold,
                feedback_template: config.pipeline.feedback_template.as_deref(),
                instructions: config.pipeline.instructions.as_deref(),
                timeout_secs: config.pipeline.timeout_secs,
            },
        }
    }
}
