use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors produced while pricing a single configuration.
///
/// All of them are local and recoverable: the caller decides whether to show
/// "pricing unavailable", fall back to no service, or treat the form as
/// incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingError {
    /// Pages or copies below one, or a quantity that does not fit
    #[error("Invalid quantity: pages={pages}, copies={copies}")]
    InvalidQuantity { pages: u32, copies: u32 },

    /// No tier covers the quantity (unknown color class)
    #[error("No pricing tier for color class '{color_class}' at quantity {quantity}")]
    NoPricingTier { color_class: String, quantity: u64 },

    /// Print type is neither single nor double, or not offered for the class
    #[error("Invalid print type: {0}")]
    InvalidPrintType(String),

    /// Service id not present in the service table
    #[error("Unknown service: {0}")]
    UnknownService(String),
}

impl PricingError {
    /// Short machine-readable label, used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidQuantity { .. } => "invalid_quantity",
            Self::NoPricingTier { .. } => "no_pricing_tier",
            Self::InvalidPrintType(_) => "invalid_print_type",
            Self::UnknownService(_) => "unknown_service",
        }
    }
}

/// Price column of a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Single,
    Double,
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Double => write!(f, "double"),
        }
    }
}

/// A single rule broken by a candidate tier table.
///
/// Indices refer to positions in the submitted list.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum TierViolation {
    #[error("tier table is empty")]
    EmptyTable,

    #[error("first tier must start at 1, found {found}")]
    FirstTierNotAtOne { found: i64 },

    #[error("tier {index} has min {min} below 1")]
    MinBelowOne { index: usize, min: i64 },

    #[error("tier {index} max is smaller than its min")]
    MaxNotGreaterThanMin { index: usize },

    #[error("tier {index} is not sorted ascending by min")]
    UnsortedTiers { index: usize },

    #[error("gap between tier {after_index} and the next tier")]
    GapBetweenTiers { after_index: usize },

    #[error("tier {index} overlaps the previous tier")]
    OverlappingTiers { index: usize },

    #[error("unbounded tier {index} is not the last tier")]
    UnboundedNotLast { index: usize },

    #[error("no tier has an unbounded max")]
    MissingUnboundedTail,

    #[error("tier {index} has a negative {field} price")]
    NegativePrice { index: usize, field: PriceField },

    #[error("tier {index} bound {value} is out of range")]
    BoundOutOfRange { index: usize, value: i64 },
}

/// Store, loader and configuration errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown color class: {0}")]
    UnknownColorClass(String),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Tier table for '{color_class}' rejected: {}", render_violations(.violations))]
    TierTableInvalid {
        color_class: String,
        violations: Vec<TierViolation>,
    },

    #[error("Invalid service '{id}': {reason}")]
    InvalidService { id: String, reason: String },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn render_violations(violations: &[TierViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = PricingError::UnknownService("laminate".to_string());
        assert_eq!(error.to_string(), "Unknown service: laminate");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            PricingError::InvalidQuantity { pages: 0, copies: 1 }.kind(),
            "invalid_quantity"
        );
        assert_eq!(
            PricingError::InvalidPrintType("triple".to_string()).kind(),
            "invalid_print_type"
        );
    }

    #[test]
    fn test_tier_table_invalid_lists_every_rule() {
        let error = AppError::TierTableInvalid {
            color_class: "a4_bw_simple".to_string(),
            violations: vec![
                TierViolation::GapBetweenTiers { after_index: 0 },
                TierViolation::MissingUnboundedTail,
            ],
        };
        let message = error.to_string();
        assert!(message.contains("a4_bw_simple"));
        assert!(message.contains("gap between tier 0"));
        assert!(message.contains("no tier has an unbounded max"));
    }
}
