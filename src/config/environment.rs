use anyhow::{Context, Result, anyhow};
use std::env;
use std::str::FromStr;

use super::builder::ConfigBuilder;
use super::types::ProviderType;

pub fn apply_env_overrides(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    if let Some(provider_raw) = env_string("AGENTS_PROVIDER")? {
        let provider = provider_raw
            .parse::<ProviderType>()
            .with_context(|| format!("Failed to parse AGENTS_PROVIDER value '{provider_raw}'"))?;
        if builder.llm.provider != provider {
            let base_url = provider_base_url(provider)?;
            builder = builder.with_llm(|llm| {
                llm.provider = provider;
                llm.base_url = base_url;
            });
        }
    }

    let provider = builder.llm.provider;

    if provider == ProviderType::Ollama && env_string("OLLAMA_BASE_URL")?.is_some() {
        let base_url = provider_base_url(provider)?;
        builder = builder.with_llm(|llm| llm.base_url = base_url);
    }

    if let Some(base_url) = env_string("AGENTS_BASE_URL")? {
        builder = builder.with_llm(|llm| llm.base_url = base_url);
    }

    if let Some(var) = provider.api_key_env_var() {
        if let Some(api_key) = env_string(var)? {
            builder = builder.with_llm(|llm| llm.api_key = api_key);
        }
    }

    if let Some(timeout) = env_parse::<u64>("AGENTS_TIMEOUT_SECS")? {
        builder = builder.with_llm(|llm| llm.timeout_secs = timeout);
    }

    if let Some(temperature) = env_parse::<f32>("AGENTS_TEMPERATURE")? {
        builder = builder.with_llm(|llm| llm.temperature = temperature);
    }

    if let Some(generator) = env_string("AGENTS_GENERATOR_MODEL")? {
        builder = builder.with_models(|models| models.generator = Some(generator));
    }

    if let Some(evaluator) = env_string("AGENTS_EVALUATOR_MODEL")? {
        builder = builder.with_models(|models| models.evaluator = Some(evaluator));
    }

    if let Some(max_tokens) = env_parse::<u32>("AGENTS_MAX_TOKENS")? {
        builder = builder.with_models(|models| models.max_tokens = max_tokens);
    }

    if let Some(max_attempts) = env_parse::<usize>("AGENTS_MAX_ATTEMPTS")? {
        builder = builder.with_pipeline(|pipeline| pipeline.max_attempts = max_attempts);
    }

    if let Some(threshold) = env_parse::<f64>("AGENTS_PASS_THRESHOLD")? {
        builder = builder.with_pipeline(|pipeline| pipeline.pass_threshold = threshold);
    }

    Ok(builder)
}

/// Endpoint for `provider`. Ollama honours `OLLAMA_BASE_URL` (host only,
/// `/v1` is appended); everything else uses the built-in default.
pub fn provider_base_url(provider: ProviderType) -> Result<String> {
    if provider == ProviderType::Ollama {
        if let Some(host) = env_string("OLLAMA_BASE_URL")? {
            return Ok(format!("{}/v1", host.trim().trim_end_matches('/')));
        }
    }
    Ok(provider.default_base_url().to_string())
}

pub fn env_string(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(anyhow!("{key} contains invalid UTF-8")),
    }
}

pub fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env_string(key)? {
        Some(value) => {
            let parsed = value
                .trim()
                .parse::<T>()
                .with_context(|| format!("Failed to parse {key} value '{value}'"))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
