//! `cardchat demo` — Play a scripted conversation.

use std::path::Path;
use std::time::Duration;

use cardchat_agent::{ConsoleSink, ScriptReport, demo_script, load_script};
use cardchat_config::AppConfig;

use super::CommandResult;

pub async fn run(
    config_path: Option<&Path>,
    script_path: Option<&Path>,
    delay_ms: Option<u64>,
) -> CommandResult {
    let config = super::load_config(config_path)?;
    super::require_api_key(&config, config_path)?;

    let inputs = resolve_script(&config, script_path)?;
    let delay = Duration::from_millis(delay_ms.unwrap_or(config.demo.delay_ms));

    let mut session = super::build_session(&config, ConsoleSink::stdout())?;
    tracing::info!(
        provider = session.provider_name(),
        model = session.model(),
        turns = inputs.len(),
        "Starting demo"
    );

    println!("--------------------------");
    let report = session.run_script(&inputs, delay).await;
    println!();
    println!("--------------------------");

    eprintln!("{}", summary(&report));
    Ok(())
}

/// `--script` file first, then `[demo].script` from config, then the built-in list.
fn resolve_script(
    config: &AppConfig,
    script_path: Option<&Path>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    if let Some(path) = script_path {
        let inputs = load_script(path)
            .map_err(|e| format!("Failed to read script {}: {e}", path.display()))?;
        if inputs.is_empty() {
            return Err(format!("Script {} has no inputs", path.display()).into());
        }
        return Ok(inputs);
    }

    if !config.demo.script.is_empty() {
        return Ok(config.demo.script.clone());
    }

    Ok(demo_script())
}

fn summary(report: &ScriptReport) -> String {
    let mut line = format!("{}/{} turns answered", report.replied, report.total());
    if report.failed() > 0 {
        line.push_str(&format!(
            " ({} rate limited, {} invalid key, {} other)",
            report.rate_limited, report.invalid_credential, report.other_failures
        ));
    }
    if report.total_tokens > 0 {
        line.push_str(&format!(", {} tokens", report.total_tokens));
    }
    line
}
