use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "print-pricing", version, about = "Tiered print job pricing")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Price one print job configuration
    Quote {
        /// Color class id, e.g. a4_bw_simple
        #[arg(long)]
        color_class: String,

        /// single or double
        #[arg(long, default_value = "single")]
        print_type: String,

        /// Pages per copy
        #[arg(long)]
        pages: u32,

        /// Number of copies
        #[arg(long, default_value = "1")]
        copies: u32,

        /// Add-on service id (defaults to the configured default service)
        #[arg(long)]
        service: Option<String>,

        /// Print the breakdown as JSON
        #[arg(long)]
        json: bool,
    },

    /// Tier table commands
    Tiers {
        #[command(subcommand)]
        action: TierCommands,
    },

    /// List add-on services
    Services,

    /// Catalog file commands
    Catalog {
        #[command(subcommand)]
        action: CatalogCommands,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TierCommands {
    /// Show tier tables
    List {
        /// Only this color class
        #[arg(long)]
        color_class: Option<String>,
    },

    /// Validate a candidate tier list (JSON array) for a color class
    Check {
        /// Color class the tiers belong to
        color_class: String,

        /// JSON file holding [{min, max, single, double}, ...]
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CatalogCommands {
    /// Validate a catalog file (.json or .toml)
    Validate {
        path: PathBuf,
    },

    /// Print the active catalog as JSON
    Export,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Validate configuration file
    Validate,
}
