use anyhow::{Context, Result};
use dirs::home_dir;
use std::{fs, path::Path};

use super::Config;
use super::builder::ConfigBuilder;
use super::environment::apply_env_overrides;
use super::types::{FileConfig, PersistedConfig, ProviderType};
use super::validation::validate;

impl Config {
    pub fn config_path() -> Result<std::path::PathBuf> {
        let mut path = home_dir().context("Could not determine home directory")?;
        path.push(".agents-sdk/config");
        Ok(path)
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Defaults, then the config file (if any), then the environment.
    pub fn load() -> Result<Self> {
        let config = Self::load_unvalidated()?;
        validate(&config)?;
        Ok(config)
    }

    /// Like [`Config::load`] without the final validation, for commands that
    /// edit the configuration.
    pub fn load_unvalidated() -> Result<Self> {
        let path = Self::config_path()?;
        let mut builder = ConfigBuilder::new();

        if path.exists() {
            builder = Self::apply_file(builder, &path)?;
        }

        builder = apply_env_overrides(builder)?;
        builder.build()
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create config directory {}", parent.display())
            })?;
        }

        let payload = PersistedConfig::from(self);
        let json = serde_json::to_string_pretty(&payload)
            .context("Failed to serialize configuration to JSON")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate(self)
    }

    fn apply_file(builder: ConfigBuilder, path: &Path) -> Result<ConfigBuilder> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed reading config at {}", path.display()))?;

        if contents.trim().is_empty() {
            return Ok(builder);
        }

        let file: FileConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed parsing JSON config at {}", path.display()))?;

        file.apply(builder)
    }
}

impl FileConfig {
    pub fn apply(self, builder: ConfigBuilder) -> Result<ConfigBuilder> {
        let mut builder = builder;

        if let Some(llm) = self.llm {
            let provider = llm
                .provider
                .as_deref()
                .map(str::parse::<ProviderType>)
                .transpose()
                .context("Invalid llm.provider in config file")?;

            builder = builder.with_llm(|settings| {
                if let Some(provider) = provider {
                    if settings.provider != provider {
                        settings.provider = provider;
                        settings.base_url = provider.default_base_url().to_string();
                    }
                }
                if let Some(api_key) = llm.api_key {
                    settings.api_key = api_key;
                }
                if let Some(timeout) = llm.timeout_secs {
                    settings.timeout_secs = timeout;
                }
                if let Some(base_url) = llm.base_url {
                    settings.base_url = base_url;
                }
                if let Some(user_agent) = llm.user_agent {
                    settings.user_agent = user_agent;
                }
                if let Some(temperature) = llm.temperature {
                    settings.temperature = temperature;
                }
                if let Some(thinking) = llm.thinking {
                    settings.thinking = thinking;
                }
            });
        }

        if let Some(models) = self.models {
            builder = builder.with_models(|settings| {
                if models.generator.is_some() {
                    settings.generator = models.generator;
                }
                if models.evaluator.is_some() {
                    settings.evaluator = models.evaluator;
                }
                if let Some(max_tokens) = models.max_tokens {
                    settings.max_tokens = max_tokens;
                }
            });
        }

        if let Some(pipeline) = self.pipeline {
            builder = builder.with_pipeline(|settings| {
                if let Some(max_attempts) = pipeline.max_attempts {
                    settings.max_attempts = max_attempts;
                }
                if let Some(threshold) = pipeline.pass_threshold {
                    settings.pass_threshold = threshold;
                }
                if pipeline.feedback_template.is_some() {
                    settings.feedback_template = pipeline.feedback_template;
                }
                if pipeline.instructions.is_some() {
                    settings.instructions = pipeline.instructions;
                }
                if pipeline.timeout_secs.is_some() {
                    settings.timeout_secs = pipeline.timeout_secs;
                }
            });
        }

        Ok(builder)
    }
}
