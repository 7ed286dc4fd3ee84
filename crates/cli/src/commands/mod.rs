//! CLI subcommands and the setup they share.

use std::path::{Path, PathBuf};

use cardchat_agent::{ChatSession, OutputSink};
use cardchat_config::AppConfig;

pub mod ask;
pub mod chat;
pub mod config_cmd;
pub mod demo;
pub mod doctor;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Resolve the config file path: `--config` or the default location.
pub fn config_file(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Load config from file, `.env`, and environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = AppConfig::load_with(&config_file(path))
        .map_err(|e| format!("Failed to load config: {e}"))?;
    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}

/// Local OpenAI-compatible servers run without a key.
pub fn needs_api_key(provider: &str) -> bool {
    !matches!(provider, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Fail early, with setup instructions, when no API key is configured.
pub fn require_api_key(config: &AppConfig, path: Option<&Path>) -> CommandResult {
    if config.has_api_key() || !needs_api_key(&config.default_provider) {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables (or put it in a .env file):");
    eprintln!("    GOOGLE_API_KEY=AIza...        (Gemini, recommended)");
    eprintln!("    OPENAI_API_KEY=sk-...         (with default_provider = \"openai\")");
    eprintln!("    CARDCHAT_API_KEY=...          (generic)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", config_file(path).display());
    eprintln!();
    eprintln!("  Get a Gemini key at: https://aistudio.google.com/app/apikey");
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}

/// Build a chat session for the configured default provider.
pub fn build_session<S: OutputSink>(
    config: &AppConfig,
    sink: S,
) -> Result<ChatSession<S>, Box<dyn std::error::Error>> {
    let router = cardchat_providers::build_from_config(config)?;
    let provider = router.default().ok_or("No default provider configured")?;
    Ok(ChatSession::from_config(config, provider, sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardchat_agent::RecordingSink;

    #[test]
    fn explicit_config_path_wins() {
        let path = config_file(Some(Path::new("/tmp/cardchat-test.toml")));
        assert_eq!(path, PathBuf::from("/tmp/cardchat-test.toml"));
        assert!(config_file(None).ends_with(".cardchat/config.toml"));
    }

    #[test]
    fn local_providers_skip_key_check() {
        assert!(needs_api_key("google"));
        assert!(needs_api_key("openai"));
        assert!(!needs_api_key("ollama"));

        let config = AppConfig {
            default_provider: "ollama".into(),
            ..AppConfig::default()
        };
        assert!(require_api_key(&config, None).is_ok());
    }

    #[test]
    fn missing_key_is_rejected() {
        let config = AppConfig::default();
        assert!(require_api_key(&config, None).is_err());

        let config = AppConfig {
            api_key: Some("AIza-test".into()),
            ..AppConfig::default()
        };
        assert!(require_api_key(&config, None).is_ok());
    }

    #[test]
    fn session_uses_default_provider() {
        let config = AppConfig::default();
        let session = build_session(&config, RecordingSink::new()).unwrap();
        assert_eq!(session.provider_name(), "google");
        assert_eq!(session.model(), "gemini-2.0-flash-lite");
        assert_eq!(session.history().max_turns(), 10);
    }
}
