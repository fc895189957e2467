use anyhow::{Context, Result, bail};

use agents_sdk_models::config::{Config, ProviderType, provider_base_url};

pub(crate) fn join_prompt(words: &[String]) -> Result<String> {
    let prompt = words.join(" ").trim().to_owned();
    if prompt.is_empty() {
        bail!("Prompt cannot be empty");
    }
    Ok(prompt)
}

/// Switches the active provider, resolving its endpoint the way the
/// environment layer does and picking the key from the provider's variable.
pub(crate) fn apply_provider_override(config: &mut Config, raw: &str) -> Result<()> {
    let provider = raw
        .trim()
        .parse::<ProviderType>()
        .with_context(|| format!("Unknown provider '{raw}'"))?;

    if provider != config.llm.provider {
        config.llm.provider = provider;
        config.llm.base_url = provider_base_url(provider)?;
        config.llm.api_key = provider
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default();
        config.models.generator = None;
        config.models.evaluator = None;
    }
    Ok(())
}

pub(crate) fn mask_api_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }

    let visible = key.chars().take(8).collect::<String>();
    format!("{visible}***")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_all_but_prefix() {
        assert_eq!(mask_api_key(""), "(not set)");
        assert_eq!(mask_api_key("sk-1234567890"), "sk-12345***");
        assert_eq!(mask_api_key("abc"), "abc***");
    }

    #[test]
    fn provider_override_keeps_ollama_host_from_environment() {
        let previous = std::env::var("OLLAMA_BASE_URL").ok();
        unsafe { std::env::set_var("OLLAMA_BASE_URL", "http://gpu-box:11434/") };

        let mut config = Config::builder().build().unwrap();
        let outcome = apply_provider_override(&mut config, "ollama");

        match previous {
            Some(value) => unsafe { std::env::set_var("OLLAMA_BASE_URL", value) },
            None => unsafe { std::env::remove_var("OLLAMA_BASE_URL") },
        }

        outcome.unwrap();
        assert_eq!(config.llm.provider, ProviderType::Ollama);
        assert_eq!(config.llm.base_url, "http://gpu-box:11434/v1");
        assert!(config.llm.api_key.is_empty());
    }

    #[test]
    fn empty_prompt_is_rejected() {
        assert!(join_prompt(&["  ".to_string()]).is_err());
        assert_eq!(
            join_prompt(&["write".to_string(), "a poem".to_string()]).unwrap(),
            "write a poem"
        );
    }
}
