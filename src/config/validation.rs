use anyhow::{Result, bail};

use super::types::Config;

pub fn validate(config: &Config) -> Result<()> {
    let provider = config.llm.provider;
    if let Some(env_var) = provider.api_key_env_var() {
        if config.llm.api_key.trim().is_empty() {
            bail!(
                "{} API key not found. Set {} or add it to {}",
                provider.display_name(),
                env_var,
                Config::config_path()?.display()
            );
        }
    }

    if config.pipeline.max_attempts < 1 {
        bail!("pipeline.max_attempts must be at least 1");
    }

    if !config.pipeline.pass_threshold.is_finite() {
        bail!("pipeline.pass_threshold must be a finite number");
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        bail!(
            "llm.temperature must be between 0 and 2 (got {})",
            config.llm.temperature
        );
    }

    Ok(())
}
