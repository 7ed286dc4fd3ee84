//! Provider router — selects the correct LLM provider based on config.
//!
//! Handles provider creation and lookup by name.

use std::collections::HashMap;
use std::sync::Arc;
use cardchat_core::error::ProviderError;
use cardchat_core::provider::Provider;
use crate::google::GoogleProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Build providers from configuration.
///
/// Every `[providers.<name>]` table gets a provider, and the default provider
/// is always registered even when it has no table of its own.
pub fn build_from_config(
    config: &cardchat_config::AppConfig,
) -> Result<ProviderRouter, ProviderError> {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = config.api_key_for(name).unwrap_or_default();
        let provider = build_provider(
            name,
            &api_key,
            provider_config.api_url.as_deref(),
            config.request_timeout_secs,
        )?;
        router.register(name.clone(), provider);
    }

    if router.get(&config.default_provider).is_none() {
        let api_key = config.api_key_for(&config.default_provider).unwrap_or_default();
        let provider = build_provider(
            &config.default_provider,
            &api_key,
            None,
            config.request_timeout_secs,
        )?;
        router.register(config.default_provider.clone(), provider);
    }

    Ok(router)
}

fn build_provider(
    name: &str,
    api_key: &str,
    api_url: Option<&str>,
    timeout_secs: u64,
) -> Result<Arc<dyn Provider>, ProviderError> {
    if is_google(name) {
        let mut p = GoogleProvider::with_timeout(api_key, timeout_secs)?;
        if let Some(url) = api_url {
            p = p.with_base_url(url);
        }
        return Ok(Arc::new(p));
    }

    let base_url = api_url
        .map(String::from)
        .unwrap_or_else(|| default_base_url(name));
    Ok(Arc::new(OpenAiCompatProvider::with_timeout(
        name,
        &base_url,
        api_key,
        timeout_secs,
    )?))
}

fn is_google(name: &str) -> bool {
    matches!(name, "google" | "gemini")
}

/// Get the default base URL for well-known OpenAI-compatible providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
