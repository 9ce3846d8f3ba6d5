//! Configuration loading, validation, and management for NeuroQueue.
//!
//! Loads configuration from `~/.neuroqueue/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.neuroqueue/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model passed to the generation backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Generation backend executable
    #[serde(default = "default_ollama_binary")]
    pub ollama_binary: String,

    /// Per-call generation timeout
    #[serde(default = "default_timeout_secs")]
    pub generation_timeout_secs: u64,

    /// Working memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Workflow execution configuration
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Document retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

fn default_model() -> String {
    "llama3:latest".into()
}
fn default_ollama_binary() -> String {
    "ollama".into()
}
fn default_timeout_secs() -> u64 {
    300
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default = "default_true")]
    pub salience_enabled: bool,
}

fn default_capacity() -> usize {
    5
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            salience_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Run agents concurrently and merge with a consensus step
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// JSONL document file; `None` uses `~/.neuroqueue/documents.jsonl`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist_path: Option<PathBuf>,
}

fn default_top_k() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: default_top_k(),
            persist_path: None,
        }
    }
}

impl RetrievalConfig {
    /// The configured document file, or the default location.
    pub fn resolved_path(&self) -> PathBuf {
        self.persist_path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("documents.jsonl"))
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.neuroqueue/config.toml),
    /// then apply environment overrides:
    /// - `LLM_MODEL`
    /// - `FIFO_SIZE`
    /// - `ENABLE_SALIENCE`
    /// - `PARALLEL_MODE`
    /// - `ENABLE_RAG`
    /// - `NEUROQUEUE_OLLAMA_BIN`
    /// - `NEUROQUEUE_TIMEOUT_SECS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup("LLM_MODEL") {
            self.model = model;
        }
        if let Some(binary) = lookup("NEUROQUEUE_OLLAMA_BIN") {
            self.ollama_binary = binary;
        }
        if let Some(secs) = parse_var(&lookup, "NEUROQUEUE_TIMEOUT_SECS") {
            self.generation_timeout_secs = secs;
        }
        if let Some(size) = parse_var(&lookup, "FIFO_SIZE") {
            self.memory.capacity = size;
        }
        if let Some(flag) = bool_var(&lookup, "ENABLE_SALIENCE") {
            self.memory.salience_enabled = flag;
        }
        if let Some(flag) = bool_var(&lookup, "PARALLEL_MODE") {
            self.workflow.parallel = flag;
        }
        if let Some(flag) = bool_var(&lookup, "ENABLE_RAG") {
            self.retrieval.enabled = flag;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".neuroqueue")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "memory.capacity must be at least 1".into(),
            ));
        }

        if self.generation_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "generation_timeout_secs must be at least 1".into(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".into(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        Ok(())
    }

    /// Render the configuration as TOML (for the `config` command).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        Self::default().to_toml()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            ollama_binary: default_ollama_binary(),
            generation_timeout_secs: default_timeout_secs(),
            memory: MemoryConfig::default(),
            workflow: WorkflowConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}

fn bool_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let raw = lookup(key)?;
    match raw.trim().to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => {
            tracing::warn!(key, value = %raw, "Ignoring non-boolean environment override");
            None
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
