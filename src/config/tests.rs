use std::sync::{Mutex, MutexGuard, OnceLock};
use tempfile::TempDir;

use crate::config::environment::{env_parse, env_string};
use crate::config::{
    Config, DEFAULT_ANTHROPIC_BASE_URL, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OPENAI_BASE_URL,
    ProviderType, provider_base_url,
};
use crate::pipeline::DEFAULT_PASS_THRESHOLD;

const TRACKED_VARS: &[&str] = &[
    "AGENTS_PROVIDER",
    "AGENTS_BASE_URL",
    "AGENTS_TIMEOUT_SECS",
    "AGENTS_TEMPERATURE",
    "AGENTS_GENERATOR_MODEL",
    "AGENTS_EVALUATOR_MODEL",
    "AGENTS_MAX_TOKENS",
    "AGENTS_MAX_ATTEMPTS",
    "AGENTS_PASS_THRESHOLD",
    "OPENAI_API_KEY",
    "GOOGLE_API_KEY",
    "ANTHROPIC_API_KEY",
    "OLLAMA_BASE_URL",
];

fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    /// Clears every variable the loader reads, then applies `vars`.
    fn new(vars: &[(&str, Option<&str>)]) -> Self {
        let keys = TRACKED_VARS
            .iter()
            .copied()
            .chain(vars.iter().map(|(key, _)| *key))
            .collect::<Vec<_>>();
        let saved = keys
            .iter()
            .map(|key| (key.to_string(), std::env::var(key).ok()))
            .collect::<Vec<_>>();

        for key in TRACKED_VARS {
            unsafe { std::env::remove_var(key) };
        }
        for (key, value) in vars {
            match value {
                Some(val) => unsafe { std::env::set_var(key, val) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.saved.iter().rev() {
            match value {
                Some(val) => unsafe { std::env::set_var(key, val) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}

fn write_config(home: &TempDir, contents: &str) {
    let config_dir = home.path().join(".agents-sdk");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config"), contents).unwrap();
}

#[test]
fn load_from_env_only() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let home = temp_home.path().to_str().unwrap().to_string();

    let _env = EnvGuard::new(&[
        ("HOME", Some(home.as_str())),
        ("OPENAI_API_KEY", Some("env-key")),
        ("AGENTS_TIMEOUT_SECS", Some("45")),
        ("AGENTS_MAX_TOKENS", Some("1024")),
        ("AGENTS_GENERATOR_MODEL", Some("gpt-4o")),
        ("AGENTS_MAX_ATTEMPTS", Some("3")),
        ("AGENTS_PASS_THRESHOLD", Some("0.7")),
    ]);

    let config = Config::load().unwrap();
    assert_eq!(config.llm.provider, ProviderType::OpenAI);
    assert_eq!(config.llm.api_key, "env-key");
    assert_eq!(config.llm.timeout_secs, 45);
    assert_eq!(config.models.max_tokens, 1024);
    assert_eq!(config.generator_model(), "gpt-4o");
    assert_eq!(config.evaluator_model(), "gpt-4o");
    assert_eq!(config.pipeline.max_attempts, 3);
    assert!((config.pipeline.pass_threshold - 0.7).abs() < f64::EPSILON);
}

#[test]
fn load_prefers_env_over_file() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let home = temp_home.path().to_str().unwrap().to_string();
    write_config(
        &temp_home,
        r#"{
            "llm": { "provider": "anthropic", "api_key": "file-key", "timeout_secs": 20 },
            "models": { "generator": "claude-3-5-haiku-latest", "max_tokens": 2048 },
            "pipeline": { "max_attempts": 2, "pass_threshold": 0.9 }
        }"#,
    );

    let _env = EnvGuard::new(&[
        ("HOME", Some(home.as_str())),
        ("ANTHROPIC_API_KEY", Some("env-key")),
        ("AGENTS_TIMEOUT_SECS", Some("40")),
        ("AGENTS_MAX_ATTEMPTS", Some("4")),
    ]);

    let config = Config::load().unwrap();
    assert_eq!(config.llm.provider, ProviderType::Anthropic);
    assert_eq!(config.llm.base_url, DEFAULT_ANTHROPIC_BASE_URL);
    assert_eq!(config.llm.api_key, "env-key");
    assert_eq!(config.llm.timeout_secs, 40);
    assert_eq!(config.models.max_tokens, 2048);
    assert_eq!(config.generator_model(), "claude-3-5-haiku-latest");
    assert_eq!(config.pipeline.max_attempts, 4);
    assert!((config.pipeline.pass_threshold - 0.9).abs() < f64::EPSILON);
}

#[test]
fn load_errors_without_api_key() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let home = temp_home.path().to_str().unwrap().to_string();

    let _env = EnvGuard::new(&[("HOME", Some(home.as_str()))]);

    let err = Config::load().unwrap_err();
    assert!(err.to_string().contains("OpenAI API key not found"));
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

#[test]
fn ollama_needs_no_key_and_honours_host_override() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let home = temp_home.path().to_str().unwrap().to_string();

    let _env = EnvGuard::new(&[
        ("HOME", Some(home.as_str())),
        ("AGENTS_PROVIDER", Some("ollama")),
        ("OLLAMA_BASE_URL", Some("http://gpu-box:11434/")),
    ]);

    let config = Config::load().unwrap();
    assert_eq!(config.llm.provider, ProviderType::Ollama);
    assert_eq!(config.llm.base_url, "http://gpu-box:11434/v1");
    assert_eq!(config.generator_model(), "phi4-mini");
}

#[test]
fn load_rejects_zero_max_attempts() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let home = temp_home.path().to_str().unwrap().to_string();

    let _env = EnvGuard::new(&[
        ("HOME", Some(home.as_str())),
        ("OPENAI_API_KEY", Some("key")),
        ("AGENTS_MAX_ATTEMPTS", Some("0")),
    ]);

    let err = Config::load().unwrap_err();
    assert!(err.to_string().contains("max_attempts"));
}

#[test]
fn load_rejects_unknown_provider_in_file() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let home = temp_home.path().to_str().unwrap().to_string();
    write_config(&temp_home, r#"{ "llm": { "provider": "mistral" } }"#);

    let _env = EnvGuard::new(&[("HOME", Some(home.as_str()))]);

    let err = Config::load_unvalidated().unwrap_err();
    assert!(format!("{err:#}").contains("Unknown LLM provider 'mistral'"));
}

#[test]
fn defaults_match_pipeline_defaults() {
    let config = Config::builder().build().unwrap();
    assert_eq!(config.llm.provider, ProviderType::OpenAI);
    assert_eq!(config.llm.base_url, DEFAULT_OPENAI_BASE_URL);
    assert_eq!(config.pipeline.max_attempts, 1);
    assert_eq!(config.pipeline.pass_threshold, DEFAULT_PASS_THRESHOLD);
}

#[test]
fn save_persists_nested_structure() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let home = temp_home.path().to_str().unwrap().to_string();

    let _env = EnvGuard::new(&[("HOME", Some(home.as_str()))]);

    let mut config = Config::builder().build().unwrap();
    config.llm.api_key = "test-key".to_string();
    config.llm.timeout_secs = 55;
    config.models.max_tokens = 999;
    config.models.generator = Some("gpt-4o".to_string());
    config.pipeline.max_attempts = 3;
    config.pipeline.pass_threshold = 0.75;
    config.save().unwrap();

    let persisted = std::fs::read_to_string(Config::config_path().unwrap()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&persisted).unwrap();
    assert_eq!(json["llm"]["provider"], "openai");
    assert_eq!(json["llm"]["api_key"], "test-key");
    assert_eq!(json["llm"]["timeout_secs"], 55);
    assert_eq!(json["models"]["generator"], "gpt-4o");
    assert!(json["models"].get("evaluator").is_none());
    assert_eq!(json["models"]["max_tokens"], 999);
    assert_eq!(json["pipeline"]["max_attempts"], 3);
    assert_eq!(json["pipeline"]["pass_threshold"], 0.75);

    let reloaded = Config::load_unvalidated().unwrap();
    assert_eq!(reloaded.pipeline.max_attempts, 3);
    assert_eq!(reloaded.generator_model(), "gpt-4o");
}

#[test]
fn provider_parsing_and_inference() {
    assert_eq!("Gemini".parse::<ProviderType>().unwrap(), ProviderType::Google);
    assert_eq!("claude".parse::<ProviderType>().unwrap(), ProviderType::Anthropic);
    assert!("bogus".parse::<ProviderType>().is_err());

    assert_eq!(ProviderType::infer_from_model("claude-3-opus"), ProviderType::Anthropic);
    assert_eq!(ProviderType::infer_from_model("gemini-1.5-pro"), ProviderType::Google);
    assert_eq!(ProviderType::infer_from_model("gpt-4o-mini"), ProviderType::OpenAI);
    assert_eq!(ProviderType::infer_from_model("o3-mini"), ProviderType::OpenAI);
    assert_eq!(ProviderType::infer_from_model("llama3.1"), ProviderType::Ollama);
    assert!(!ProviderType::Ollama.requires_api_key());
}

#[test]
fn env_helpers_parse_values() {
    let _lock = env_lock();
    let _env = EnvGuard::new(&[
        ("AGENTS_TEST_STRING", Some("value")),
        ("AGENTS_TEST_BLANK", Some("  ")),
        ("AGENTS_TEST_NUMBER", Some("123")),
        ("AGENTS_TEST_BAD_NUMBER", Some("12x")),
    ]);

    assert_eq!(env_string("AGENTS_TEST_STRING").unwrap(), Some("value".to_string()));
    assert_eq!(env_string("AGENTS_TEST_BLANK").unwrap(), None);
    assert_eq!(env_string("AGENTS_TEST_MISSING").unwrap(), None);
    assert_eq!(env_parse::<u64>("AGENTS_TEST_NUMBER").unwrap(), Some(123));
    assert!(env_parse::<u32>("AGENTS_TEST_BAD_NUMBER").is_err());
}

#[test]
fn provider_base_url_honours_ollama_host_only_for_ollama() {
    let _lock = env_lock();

    {
        let _env = EnvGuard::new(&[]);
        assert_eq!(
            provider_base_url(ProviderType::Ollama).unwrap(),
            DEFAULT_OLLAMA_BASE_URL
        );
    }

    let _env = EnvGuard::new(&[("OLLAMA_BASE_URL", Some(" http://gpu-box:11434/ "))]);
    assert_eq!(
        provider_base_url(ProviderType::Ollama).unwrap(),
        "http://gpu-box:11434/v1"
    );
    assert_eq!(
        provider_base_url(ProviderType::OpenAI).unwrap(),
        DEFAULT_OPENAI_BASE_URL
    );
}
