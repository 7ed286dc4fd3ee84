//! `cardchat doctor` — Diagnose configuration and provider health.

use std::path::Path;

use cardchat_config::AppConfig;
use cardchat_core::Provider;
use cardchat_providers::ProviderRouter;

use super::CommandResult;

pub async fn run(config_path: Option<&Path>) -> CommandResult {
    println!("🩺 cardchat Doctor — Diagnostics");
    println!("================================\n");

    let mut issues = 0;

    let file = super::config_file(config_path);
    if file.exists() {
        println!("  ✅ Config file found at {}", file.display());
    } else {
        println!("  ⚠️  No config file, using defaults (run `cardchat config --init`)");
    }

    let config = match AppConfig::load_with(&file) {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!();
            println!("  ⚠️  1 blocking issue found. Fix the config and run again.");
            return Ok(());
        }
    };

    println!("     Provider:  {}", config.default_provider);
    println!("     Model:     {}", config.effective_model());
    println!("     History:   {} turns", config.history.max_turns);

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else if super::needs_api_key(&config.default_provider) {
        println!("  ❌ No API key: set GOOGLE_API_KEY in the environment or .env");
        issues += 1;
    } else {
        println!("  ✅ Local provider, no API key needed");
    }

    if issues == 0 {
        issues += check_provider(&config).await;
    } else {
        println!("  ⏭️  Skipping provider check");
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Returns the number of issues found.
async fn check_provider(config: &AppConfig) -> usize {
    let router = match cardchat_providers::build_from_config(config) {
        Ok(router) => router,
        Err(e) => {
            println!("  ❌ Could not build provider: {e}");
            return 1;
        }
    };
    println!("     Registered: {}", provider_summary(&router, &config.default_provider));

    let Some(provider) = router.default() else {
        println!("  ❌ Provider '{}' is not registered", config.default_provider);
        return 1;
    };

    match provider.health_check().await {
        Ok(true) => {
            println!("  ✅ Provider '{}' reachable", provider.name());
            0
        }
        Ok(false) => {
            println!("  ❌ Provider '{}' unreachable", provider.name());
            1
        }
        Err(e) => {
            println!("  ❌ Provider '{}' rejected the request: {e}", provider.name());
            1
        }
    }
}

/// Registered provider names, the default one marked.
fn provider_summary(router: &ProviderRouter, default: &str) -> String {
    router
        .list()
        .into_iter()
        .map(|name| {
            if name == default {
                format!("{name} (default)")
            } else {
                name.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
