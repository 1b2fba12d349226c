use anyhow::{bail, Context, Result};
use colored::Colorize;
use print_pricing::config::Config;
use print_pricing::pricing::{validate_tier_table_for, PricingCatalog, TierDraft};
use std::path::Path;
use tracing::info;

use super::{format_amount, open_store};

/// Execute the tiers list command
pub async fn list(cfg: &Config, color_class: Option<&str>) -> Result<()> {
    let store = open_store(cfg).await?;
    let catalog = store.snapshot();

    let ids: Vec<&str> = match color_class {
        Some(id) if catalog.tiers_for(id).is_some() => vec![id],
        Some(id) => bail!("Unknown color class: {}", id),
        None => catalog.color_class_ids(),
    };

    for id in ids {
        print_table(&catalog, id);
    }

    Ok(())
}

/// Execute the tiers check command
///
/// Runs the same validation as the admin write path, without committing.
pub async fn check(cfg: &Config, color_class: &str, file: &Path) -> Result<()> {
    let store = open_store(cfg).await?;
    if store.snapshot().tiers_for(color_class).is_none() {
        bail!("Unknown color class: {}", color_class);
    }

    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let drafts: Vec<TierDraft> = serde_json::from_str(&content)?;

    info!(color_class, tiers = drafts.len(), "Checking tier table");
    match validate_tier_table_for(color_class, &drafts) {
        Ok(table) => {
            println!("{}", "✓ Tier table is valid".green());
            println!("  {} tiers for {}", table.len(), color_class);
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗ Tier table rejected".red());
            bail!(e)
        }
    }
}

fn print_table(catalog: &PricingCatalog, id: &str) {
    let Some(table) = catalog.tiers_for(id) else {
        return;
    };
    let label = catalog
        .color_class(id)
        .map(|c| format!("{} [{}]", c.label, c.kind))
        .unwrap_or_default();

    println!("{} {}", id.green().bold(), label.dimmed());
    for tier in table.tiers() {
        println!(
            "  {:>6} - {:<6} single {:>8}  double {:>8}",
            tier.min,
            tier.max.to_string(),
            format_amount(tier.single),
            format_amount(tier.double)
        );
    }
}
