//! Configuration loading, validation, and management for cardchat.
//!
//! Loads configuration from `~/.cardchat/config.toml`, then applies a `.env`
//! file from the working directory and environment variable overrides.
//! Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The placeholder the user template must contain.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Largest accepted `history.max_turns`.
pub const MAX_HISTORY_TURNS: usize = 10_000;

/// The root configuration structure.
///
/// Maps directly to `~/.cardchat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max output tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// HTTP request timeout for a single generation call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Conversation history window
    #[serde(default)]
    pub history: HistoryConfig,

    /// System instruction and user-turn template
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Scripted demo run settings
    #[serde(default)]
    pub demo: DemoConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "google".into()
}
fn default_model() -> String {
    "gemini-2.0-flash-lite".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_request_timeout_secs() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("history", &self.history)
            .field("persona", &self.persona)
            .field("demo", &self.demo)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of turns (not pairs) kept as context. 0 keeps nothing.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

fn default_max_turns() -> usize {
    10
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Replace the built-in sales assistant instruction entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Template for the user turn; must contain `{input}`
    #[serde(default = "default_user_template")]
    pub user_template: String,
}

fn default_user_template() -> String {
    INPUT_PLACEHOLDER.into()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            user_template: default_user_template(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Pause between scripted turns, in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Replace the built-in demo questions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub script: Vec<String>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.cardchat/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(&Self::config_dir().join("config.toml"))
    }

    /// Load configuration from `path`, then `.env` and environment overrides.
    ///
    /// API key lookup order when the file sets none:
    /// - `CARDCHAT_API_KEY` (highest priority)
    /// - `GOOGLE_API_KEY`
    /// - `OPENAI_API_KEY`
    pub fn load_with(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;

        // A missing .env is normal; a malformed one is worth a warning.
        match dotenvy::dotenv() {
            Ok(env_path) => tracing::debug!("Loaded environment from {}", env_path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {e}"),
        }

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

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = non_empty("CARDCHAT_API_KEY")
                .or_else(|| non_empty("GOOGLE_API_KEY"))
                .or_else(|| non_empty("OPENAI_API_KEY"));
        }

        if let Some(provider) = non_empty("CARDCHAT_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = non_empty("CARDCHAT_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cardchat")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.default_max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "default_max_tokens must be > 0".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        if !self.persona.user_template.contains(INPUT_PLACEHOLDER) {
            return Err(ConfigError::ValidationError(format!(
                "persona.user_template must contain {INPUT_PLACEHOLDER}"
            )));
        }

        if self.history.max_turns > MAX_HISTORY_TURNS {
            return Err(ConfigError::ValidationError(format!(
                "history.max_turns must be at most {MAX_HISTORY_TURNS}"
            )));
        }

        if self.history.max_turns == 0 {
            tracing::warn!("history.max_turns is 0; the assistant will not remember earlier turns");
        }

        Ok(())
    }

    /// Resolve the API key for a provider: per-provider key first, then the global one.
    pub fn api_key_for(&self, provider: &str) -> Option<String> {
        self.providers
            .get(provider)
            .and_then(|p| p.api_key.clone())
            .or_else(|| self.api_key.clone())
    }

    /// Model to use for the default provider.
    pub fn effective_model(&self) -> String {
        self.providers
            .get(&self.default_provider)
            .and_then(|p| p.default_model.clone())
            .unwrap_or_else(|| self.default_model.clone())
    }

    /// Check if an API key is available for the default provider.
    pub fn has_api_key(&self) -> bool {
        self.api_key_for(&self.default_provider).is_some()
    }

    /// Generate a default config TOML string (for `config --init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            history: HistoryConfig::default(),
            persona: PersonaConfig::default(),
            demo: DemoConfig::default(),
            providers: HashMap::new(),
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
