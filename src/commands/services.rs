use anyhow::Result;
use colored::Colorize;
use print_pricing::config::Config;

use super::{format_amount, open_store};

/// Execute the services command
pub async fn list(cfg: &Config) -> Result<()> {
    let store = open_store(cfg).await?;
    let catalog = store.snapshot();

    println!("{}", "Services:".green().bold());
    for service in catalog.services() {
        let gate = match service.min_quantity {
            Some(min) => format!(" (from {} sheets)", min).dimmed().to_string(),
            None => String::new(),
        };
        println!(
            "  {:<12} {:>8}  {}{}",
            service.id.cyan(),
            format_amount(service.price),
            service.label,
            gate
        );
    }
    println!(
        "  {}",
        format!("Default service: {}", cfg.quote.default_service).dimmed()
    );

    Ok(())
}
