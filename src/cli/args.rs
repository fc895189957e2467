use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use super::commands;

/// Entry point for the `agents-sdk` command-line interface.
#[derive(Debug, Parser)]
#[command(
    name = "agents-sdk",
    about = "Generate, evaluate and retry LLM answers across providers",
    version,
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Print pipeline events and provider requests to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the generate -> evaluate -> retry pipeline on a prompt.
    Run(RunArgs),
    /// Send a prompt straight to the generator model.
    Chat(ChatArgs),
    /// Update and save the configuration file.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Provider override (openai, google, anthropic, ollama)
    #[arg(long)]
    pub provider: Option<String>,

    /// Generator model (defaults to the configured generator)
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Model used as the judge; enables evaluation even for a single attempt
    #[arg(long)]
    pub evaluator_model: Option<String>,

    /// Criteria the judge grades against
    #[arg(long)]
    pub criteria: Option<String>,

    /// Attempt budget, including the first attempt
    #[arg(short = 'n', long)]
    pub max_attempts: Option<usize>,

    /// Minimum score (inclusive) for an answer to pass
    #[arg(short = 't', long)]
    pub threshold: Option<f64>,

    /// System instructions sent with every generation
    #[arg(long)]
    pub instructions: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Prompt to run through the pipeline.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub prompt: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Provider override (openai, google, anthropic, ollama)
    #[arg(long)]
    pub provider: Option<String>,

    /// Model override (defaults to the configured generator)
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Sampling temperature override
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Prompt to send.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub prompt: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Default provider
    #[arg(long)]
    pub provider: Option<String>,

    /// API key for the provider
    #[arg(long)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Context window used to size completions
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Default attempt budget
    #[arg(long)]
    pub max_attempts: Option<usize>,

    /// Default pass threshold
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Default generator model
    #[arg(long)]
    pub generator_model: Option<String>,

    /// Default evaluator model
    #[arg(long)]
    pub evaluator_model: Option<String>,

    /// Toggle extended thinking (Anthropic only)
    #[arg(long)]
    pub thinking: Option<bool>,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        commands::run(self).await
    }
}
