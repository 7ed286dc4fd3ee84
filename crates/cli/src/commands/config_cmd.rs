//! `cardchat config` — Configuration management commands.

use std::path::Path;

use cardchat_config::AppConfig;

use super::CommandResult;

const REDACTED: &str = "***";

pub fn show(config_path: Option<&Path>) -> CommandResult {
    let config = super::load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&redacted(&config))?;
    println!("# {}", super::config_file(config_path).display());
    println!("{toml_str}");
    Ok(())
}

pub fn path(config_path: Option<&Path>) -> CommandResult {
    println!("{}", super::config_file(config_path).display());
    Ok(())
}

pub fn init(config_path: Option<&Path>) -> CommandResult {
    let path = super::config_file(config_path);
    if write_default(&path)? {
        println!("  ✅ Wrote default config to {}", path.display());
        println!("  Put your key in GOOGLE_API_KEY (or a .env file) before running `cardchat demo`.");
    } else {
        println!("  Config already exists at {}, leaving it untouched.", path.display());
    }
    Ok(())
}

/// Write the default config unless a file is already there. Returns whether it wrote.
fn write_default(path: &Path) -> Result<bool, std::io::Error> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    Ok(true)
}

/// Copy of the config with every API key masked.
fn redacted(config: &AppConfig) -> AppConfig {
    let mut config = config.clone();
    if config.api_key.is_some() {
        config.api_key = Some(REDACTED.into());
    }
    for provider in config.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some(REDACTED.into());
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardchat_config::ProviderConfig;

    #[test]
    fn init_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(write_default(&path).unwrap());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("gemini-2.0-flash-lite"));

        std::fs::write(&path, "default_provider = \"openai\"\n").unwrap();
        assert!(!write_default(&path).unwrap());
        let kept = std::fs::read_to_string(&path).unwrap();
        assert_eq!(kept, "default_provider = \"openai\"\n");
    }

    #[test]
    fn written_default_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        write_default(&path).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_provider, "google");
        assert_eq!(config.history.max_turns, 10);
    }

    #[test]
    fn show_masks_keys() {
        let mut config = AppConfig {
            api_key: Some("AIza-secret".into()),
            ..AppConfig::default()
        };
        config.providers.insert(
            "openai".into(),
            ProviderConfig {
                api_key: Some("sk-secret".into()),
                api_url: None,
                default_model: None,
            },
        );

        let out = toml::to_string_pretty(&redacted(&config)).unwrap();
        assert!(!out.contains("AIza-secret"));
        assert!(!out.contains("sk-secret"));
        assert!(out.contains(REDACTED));
    }
}
