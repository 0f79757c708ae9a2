mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable that overrides `provider.api_key`
pub const API_KEY_ENV: &str = "VIDFORGE_API_KEY";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./vidforge.toml",
        "./config.toml",
        "~/.config/vidforge/config.toml",
        "/etc/vidforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.provider.api_key = Some(key);
        }
    }
}

/// Validate configuration
///
/// A missing API key is not a config error: commands that don't talk to the
/// provider work without one, and generation reports it on use.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.polling.interval_secs == 0 {
        anyhow::bail!("Polling interval must be at least 1 second");
    }

    if config.polling.max_attempts == 0 {
        anyhow::bail!("Polling max_attempts cannot be 0");
    }

    if config.upload.max_bytes == 0 {
        anyhow::bail!("Upload max_bytes cannot be 0");
    }

    if config.provider.request_timeout_secs == 0 {
        anyhow::bail!("Provider request_timeout_secs cannot be 0");
    }

    if let Some(ref query_url) = config.provider.query_url {
        if !query_url.contains("{id}") {
            anyhow::bail!("Provider query_url must contain an {{id}} placeholder");
        }
    }

    if config.provider.base_url.trim().is_empty() {
        anyhow::bail!("Provider base_url cannot be empty");
    }

    Ok(())
}
