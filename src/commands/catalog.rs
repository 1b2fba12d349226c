use anyhow::Result;
use colored::Colorize;
use print_pricing::config::Config;
use print_pricing::pricing::{load_catalog_file, loader::export_catalog_json};
use std::path::Path;
use tracing::info;

use super::open_store;

/// Execute the catalog validate command
pub async fn validate(path: &Path) -> Result<()> {
    println!("{}", "Validating catalog...".yellow());

    let catalog = load_catalog_file(path).await?;

    println!("{}", "✓ Catalog is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Paper sizes: {}", catalog.paper_sizes().len());
    println!("  Tier tables: {}", catalog.color_class_ids().len());
    println!("  Services: {}", catalog.services().len());

    info!("Catalog validation successful");
    Ok(())
}

/// Execute the catalog export command
pub async fn export(cfg: &Config) -> Result<()> {
    let store = open_store(cfg).await?;
    println!("{}", export_catalog_json(&store.snapshot())?);
    Ok(())
}
