use anyhow::{Context, Result};

use agents_sdk_models::client::ChatMessage;
use agents_sdk_models::config::Config;
use agents_sdk_models::pipeline::GenerationPort;
use agents_sdk_models::providers;

use super::args::ChatArgs;
use super::util::{apply_provider_override, join_prompt};

pub(crate) async fn handle_chat(args: ChatArgs) -> Result<()> {
    let prompt = join_prompt(&args.prompt)?;

    let mut config = Config::load_unvalidated()?;
    if let Some(provider) = &args.provider {
        apply_provider_override(&mut config, provider)?;
    }
    if let Some(temperature) = args.temperature {
        config.llm.temperature = temperature;
    }
    config.validate()?;

    let model = args
        .model
        .unwrap_or_else(|| config.generator_model().to_string());
    let generator = providers::from_settings(&config.llm, &model, config.models.max_tokens)?;

    let response = generator
        .generate(&[ChatMessage::user(prompt)])
        .await
        .context("Chat completion failed")?;

    println!("Provider: {}", config.llm.provider.display_name());
    println!("Model: {model}");
    println!();
    println!("{response}");

    Ok(())
}
