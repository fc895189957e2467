use crate::pipeline::{DEFAULT_MAX_ATTEMPTS, DEFAULT_PASS_THRESHOLD};

use super::constants::*;
use super::types::{LlmSettings, ModelSettings, PipelineSettings, ProviderType};

pub fn default_user_agent() -> String {
    format!("agents-sdk-models/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for LlmSettings {
    fn default() -> Self {
        let provider = ProviderType::OpenAI;
        Self {
            provider,
            api_key: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: provider.default_base_url().to_string(),
            user_agent: default_user_agent(),
            temperature: DEFAULT_TEMPERATURE,
            thinking: false,
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            generator: None,
            evaluator: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            feedback_template: None,
            instructions: None,
            timeout_secs: None,
        }
    }
}
