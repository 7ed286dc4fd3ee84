//! `cardchat ask` — Send a single message.

use std::path::Path;

use cardchat_agent::{ConsoleSink, ExchangeOutcome};

use super::CommandResult;

pub async fn run(config_path: Option<&Path>, message: &str) -> CommandResult {
    let config = super::load_config(config_path)?;
    super::require_api_key(&config, config_path)?;

    let mut session = super::build_session(&config, ConsoleSink::stdout())?;

    match session.converse(message).await {
        ExchangeOutcome::Replied { usage, .. } => {
            if let Some(usage) = usage {
                tracing::info!(tokens = usage.total_tokens, "Reply received");
            }
            Ok(())
        }
        // The notice is already on stdout; the exit status tells scripts it failed.
        ExchangeOutcome::Failed { kind, .. } => Err(format!("Request failed: {kind}").into()),
    }
}
