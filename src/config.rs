use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pricing::store::DEFAULT_HISTORY_LIMIT;
use crate::pricing::NO_SERVICE;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub quote: QuoteConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
    /// Catalog file (.json or .toml); the built-in catalog is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    /// Number of admin changes kept in the history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            history_limit: default_history_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuoteConfig {
    /// Service used when a quote does not name one
    #[serde(default = "default_service")]
    pub default_service: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            default_service: default_service(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_service() -> String {
    NO_SERVICE.to_string()
}

/// Load configuration from an optional file plus `PRINT_PRICING__*` env vars
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("PRINT_PRICING").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.logging.level.trim().is_empty() {
        anyhow::bail!("Log level cannot be empty");
    }

    match cfg.logging.format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}': expected 'text' or 'json'", other),
    }

    if cfg.pricing.history_limit == 0 {
        anyhow::bail!("History limit must be at least 1");
    }

    if cfg.quote.default_service.trim().is_empty() {
        anyhow::bail!("Default service cannot be empty, use 'none'");
    }

    Ok(())
}
