use anyhow::{bail, Result};
use colored::Colorize;
use print_pricing::config::Config;
use print_pricing::pricing::{PriceCalculator, PriceRequest};
use print_pricing::recompute::{LocalChannel, QuoteInput, QuoteOutcome, RecomputeController};
use std::sync::Arc;
use tracing::info;

use super::{format_amount, open_store};

/// Execute the quote command
///
/// Goes through the same recompute path the interactive form uses.
pub async fn execute(cfg: &Config, request: PriceRequest, json: bool) -> Result<()> {
    let store = Arc::new(open_store(cfg).await?);
    let calculator = PriceCalculator::new(store.clone());
    let channel = LocalChannel::new(calculator.clone());
    let controller = Arc::new(RecomputeController::new(channel));

    let input = QuoteInput::new()
        .color_class(request.color_class.clone())
        .print_type(request.print_type.clone())
        .pages(request.pages)
        .copies(request.copies)
        .service(request.service.clone());

    if let Some(handle) = controller.on_input(input) {
        handle.await?;
    }

    let state = controller.current();
    info!(seq = state.seq, catalog_version = store.version(), "Quote finished");

    match state.outcome {
        QuoteOutcome::Priced(breakdown) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&breakdown)?);
                return Ok(());
            }

            println!("{}", "Quote".green().bold());
            println!("  {}: {}", "Color class".cyan(), request.color_class);
            println!("  {}: {}", "Print type".cyan(), request.print_type);
            println!(
                "  {}: {} pages x {} copies = {} sheets",
                "Quantity".cyan(),
                request.pages,
                request.copies,
                breakdown.quantity
            );
            println!("  {}: {}", "Per sheet".cyan(), format_amount(breakdown.unit_price));
            println!("  {}: {}", "Per copy".cyan(), format_amount(breakdown.copy_price));
            println!(
                "  {}: {} ({})",
                "Service".cyan(),
                format_amount(breakdown.service_cost),
                request.service
            );
            println!("  {}: {}", "Total".bold(), format_amount(breakdown.total_price).bold());
            Ok(())
        }
        QuoteOutcome::Unavailable(e) => {
            println!("{} {}", "Pricing unavailable:".red(), e);
            bail!(e)
        }
        // Blank or zero fields never reach the channel; report them directly
        QuoteOutcome::Empty => match calculator.calculate(&request) {
            Err(e) => bail!(e),
            Ok(_) => bail!("Quote input is incomplete"),
        },
    }
}
