use anyhow::Result;
use colored::Colorize;
use print_pricing::config::Config;
use tracing::info;

/// Execute the config show command
pub fn show(cfg: &Config) -> Result<()> {
    println!("{}", "Current Configuration:".green().bold());
    println!();

    // Serialize to TOML format
    let toml_string = toml::to_string_pretty(cfg)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
///
/// Loading already validated the file; this prints what was accepted.
pub fn validate(cfg: &Config) -> Result<()> {
    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Log: {} ({})", cfg.logging.level, cfg.logging.format);
    println!(
        "  Catalog: {}",
        cfg.pricing
            .catalog_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string())
    );
    println!("  History limit: {}", cfg.pricing.history_limit);
    println!("  Default service: {}", cfg.quote.default_service);

    info!("Configuration validation successful");
    Ok(())
}
