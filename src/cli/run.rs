use std::time::Duration;

use anyhow::Result;
use tracing::warn;

use agents_sdk_models::config::Config;
use agents_sdk_models::evaluator::ModelEvaluator;
use agents_sdk_models::pipeline::{AgentPipeline, TracingSink};
use agents_sdk_models::providers;

use super::args::RunArgs;
use super::output;
use super::util::{apply_provider_override, join_prompt};

pub(crate) async fn handle_run(args: RunArgs) -> Result<()> {
    let prompt = join_prompt(&args.prompt)?;

    let mut config = Config::load_unvalidated()?;
    if let Some(provider) = &args.provider {
        apply_provider_override(&mut config, provider)?;
    }
    config.validate()?;

    let generator_model = args
        .model
        .clone()
        .unwrap_or_else(|| config.generator_model().to_string());
    let generator =
        providers::from_settings(&config.llm, &generator_model, config.models.max_tokens)?;

    let max_attempts = args.max_attempts.unwrap_or(config.pipeline.max_attempts);
    let mut builder = AgentPipeline::builder()
        .with_settings(&config.pipeline)
        .shared_generator(generator)
        .trace_sink(TracingSink)
        .max_attempts(max_attempts);

    if let Some(threshold) = args.threshold {
        builder = builder.pass_threshold(threshold);
    }
    if let Some(instructions) = &args.instructions {
        builder = builder.instructions(instructions.clone());
    }
    if let Some(secs) = args.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    let evaluator_model = if max_attempts > 1 || args.evaluator_model.is_some() {
        let model = args
            .evaluator_model
            .clone()
            .or_else(|| config.models.evaluator.clone())
            .unwrap_or_else(|| generator_model.clone());
        let judge = providers::from_settings(&config.llm, &model, config.models.max_tokens)?;
        let mut evaluator = ModelEvaluator::new(judge);
        if let Some(criteria) = &args.criteria {
            evaluator = evaluator.with_instructions(criteria.clone());
        }
        builder = builder.evaluator(evaluator);
        Some(model)
    } else {
        None
    };

    let pipeline = builder.build();
    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("unable to listen for Ctrl-C; run cannot be interrupted");
            std::future::pending::<()>().await;
        }
    };

    let result = pipeline.run_cancellable(&prompt, cancel).await?;

    if args.json {
        output::print_json(&result)
    } else {
        output::print_human(
            &result,
            &output::RunLabels {
                provider: config.llm.provider.display_name(),
                generator: &generator_model,
                evaluator: evaluator_model.as_deref(),
            },
        );
        Ok(())
    }
}
