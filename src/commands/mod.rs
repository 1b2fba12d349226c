//! Command implementations for the CLI
//!
//! - quote: price one configuration
//! - tiers: list tier tables, check a candidate tier list
//! - services: list add-on services
//! - catalog: validate or export a catalog file
//! - config: configuration display and validation

pub mod catalog;
pub mod config;
pub mod quote;
pub mod services;
pub mod tiers;

use print_pricing::config::Config;
use print_pricing::error::AppError;
use print_pricing::pricing::{load_catalog_file, PricingCatalog, PricingStore};
use tracing::info;

/// Build the pricing store from the configured catalog, or the built-in one
pub async fn open_store(cfg: &Config) -> Result<PricingStore, AppError> {
    let catalog = match &cfg.pricing.catalog_path {
        Some(path) => load_catalog_file(path).await?,
        None => {
            info!("No catalog_path configured, using built-in catalog");
            PricingCatalog::builtin()?
        }
    };

    Ok(PricingStore::with_history_limit(catalog, cfg.pricing.history_limit))
}

/// Format minor currency units with thousands separators
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(990), "990");
        assert_eq!(format_amount(1190), "1,190");
        assert_eq!(format_amount(593_810), "593,810");
        assert_eq!(format_amount(1_000_000), "1,000,000");
    }

    #[tokio::test]
    async fn test_open_store_defaults_to_builtin() {
        let store = open_store(&Config::default()).await.unwrap();
        assert_eq!(store.version(), 1);
        assert!(store.snapshot().tiers_for("a4_bw_simple").is_some());
    }
}
