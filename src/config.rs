//! TOML configuration parsing and validation.
//!
//! A single file (default `./config/umkm.toml`) describes where the dataset
//! lives, which embedding and chat providers to call, how many documents to
//! retrieve per question, and where the HTTP server binds.
//!
//! ```toml
//! [dataset]
//! path = "./data/umkm.json"
//!
//! [embedding]
//! provider = "openai"
//! model = "text-embedding-3-small"
//!
//! [llm]
//! provider = "openai"
//! model = "gpt-4o-mini"
//!
//! [server]
//! bind = "127.0.0.1:3000"
//! ```
//!
//! API keys are never stored in the file. Each provider reads the
//! environment variable named by `api_key_env` (see [`EmbeddingConfig::api_key_var`]).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Source label attached to every document when `[dataset].source_label` is unset.
pub const DEFAULT_SOURCE_LABEL: &str = "UMKM Dataset";

const KNOWN_EMBEDDING_PROVIDERS: &[&str] = &["openai", "gemini", "ollama", "local"];
const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "gemini", "ollama"];

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    pub path: PathBuf,
    #[serde(default = "default_source_label")]
    pub source_label: String,
}

fn default_source_label() -> String {
    DEFAULT_SOURCE_LABEL.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL override (OpenAI-compatible gateways, remote Ollama).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

impl EmbeddingConfig {
    /// Name of the environment variable holding the provider API key.
    ///
    /// Returns `None` for providers that do not authenticate (`ollama`, `local`).
    pub fn api_key_var(&self) -> Option<String> {
        api_key_var(&self.provider, self.api_key_env.as_deref())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.7
}
fn default_llm_timeout_secs() -> u64 {
    120
}

impl LlmConfig {
    /// Name of the environment variable holding the provider API key.
    pub fn api_key_var(&self) -> Option<String> {
        api_key_var(&self.provider, self.api_key_env.as_deref())
    }
}

fn api_key_var(provider: &str, explicit: Option<&str>) -> Option<String> {
    if let Some(name) = explicit {
        return Some(name.to_string());
    }
    match provider {
        "openai" => Some("OPENAI_API_KEY".to_string()),
        "gemini" => Some("GOOGLE_API_KEY".to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit one JSON object per line instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Relative dataset paths are relative to the config file, never the cwd
    if config.dataset.path.is_relative() {
        if let Some(parent) = path.parent() {
            config.dataset.path = parent.join(&config.dataset.path);
        }
    }

    validate(&config)?;
    Ok(config)
}

/// Check value ranges and provider names.
///
/// Called by [`load_config`]; exposed so configs built in code (tests,
/// custom binaries) get the same checks.
pub fn validate(config: &Config) -> Result<()> {
    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    if config.embedding.batch_size < 1 {
        anyhow::bail!("embedding.batch_size must be >= 1");
    }

    if config.embedding.dims == Some(0) {
        anyhow::bail!("embedding.dims must be > 0 when set");
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        anyhow::bail!("llm.temperature must be in [0.0, 2.0]");
    }

    if config.embedding.model.trim().is_empty() {
        anyhow::bail!("embedding.model must not be empty");
    }
    if config.llm.model.trim().is_empty() {
        anyhow::bail!("llm.model must not be empty");
    }

    if !KNOWN_EMBEDDING_PROVIDERS.contains(&config.embedding.provider.as_str()) {
        anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be openai, gemini, ollama, or local.",
            config.embedding.provider
        );
    }
    if !KNOWN_LLM_PROVIDERS.contains(&config.llm.provider.as_str()) {
        anyhow::bail!(
            "Unknown llm provider: '{}'. Must be openai, gemini, or ollama.",
            config.llm.provider
        );
    }

    Ok(())
}
