use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use print_pricing::{config, init_tracing, metrics};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = cli::Cli::parse();

    let cfg = config::load_config(&args.config)?;
    init_tracing(&cfg.logging);
    metrics::init_metric_descriptions();

    // Dispatch to appropriate command handler
    match args.command {
        cli::Commands::Quote {
            color_class,
            print_type,
            pages,
            copies,
            service,
            json,
        } => {
            let service = service.unwrap_or_else(|| cfg.quote.default_service.clone());
            let request = print_pricing::pricing::PriceRequest::new(color_class, print_type, pages, copies)
                .with_service(service);
            commands::quote::execute(&cfg, request, json).await?;
        }
        cli::Commands::Tiers { action } => match action {
            cli::TierCommands::List { color_class } => {
                commands::tiers::list(&cfg, color_class.as_deref()).await?
            }
            cli::TierCommands::Check { color_class, file } => {
                commands::tiers::check(&cfg, &color_class, &file).await?
            }
        },
        cli::Commands::Services => commands::services::list(&cfg).await?,
        cli::Commands::Catalog { action } => match action {
            cli::CatalogCommands::Validate { path } => commands::catalog::validate(&path).await?,
            cli::CatalogCommands::Export => commands::catalog::export(&cfg).await?,
        },
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&cfg)?,
            cli::ConfigCommands::Validate => commands::config::validate(&cfg)?,
        },
        cli::Commands::Version => {
            println!("Print Pricing v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
