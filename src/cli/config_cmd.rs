use anyhow::{Result, bail};

use agents_sdk_models::config::Config;

use super::args::ConfigArgs;
use super::util::{apply_provider_override, mask_api_key};

pub(crate) fn handle_config(args: ConfigArgs) -> Result<()> {
    let mut config = Config::load_unvalidated()?;

    if let Some(provider) = &args.provider {
        apply_provider_override(&mut config, provider)?;
    }

    if let Some(api_key) = args.api_key {
        config.llm.api_key = api_key;
    }

    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            bail!("Timeout must be a positive number of seconds");
        }
        config.llm.timeout_secs = timeout;
    }

    if let Some(max_tokens) = args.max_tokens {
        config.models.max_tokens = max_tokens;
    }

    if let Some(max_attempts) = args.max_attempts {
        config.pipeline.max_attempts = max_attempts;
    }

    if let Some(threshold) = args.threshold {
        config.pipeline.pass_threshold = threshold;
    }

    if let Some(model) = args.generator_model {
        config.models.generator = Some(model);
    }

    if let Some(model) = args.evaluator_model {
        config.models.evaluator = Some(model);
    }

    if let Some(thinking) = args.thinking {
        config.llm.thinking = thinking;
    }

    config.validate()?;
    config.save()?;

    println!(
        "✅ Configuration saved to {}",
        Config::config_path()?.display()
    );
    println!("📋 Current configuration:");
    println!("   Provider: {}", config.llm.provider.display_name());
    println!("   API Key: {}", mask_api_key(&config.llm.api_key));
    println!("   Base URL: {}", config.llm.base_url);
    println!("   Timeout: {}s", config.llm.timeout_secs);
    println!("   Max Tokens: {}", config.models.max_tokens);
    println!("   Generator Model: {}", config.generator_model());
    println!("   Evaluator Model: {}", config.evaluator_model());
    println!("   Max Attempts: {}", config.pipeline.max_attempts);
    println!("   Pass Threshold: {}", config.pipeline.pass_threshold);

    Ok(())
}
