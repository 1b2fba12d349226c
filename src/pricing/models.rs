use crate::error::PricingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Service id meaning "no add-on selected"
pub const NO_SERVICE: &str = "none";

/// Classification of a color class; decides which print types are offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorKind {
    Bw,
    Color,
}

impl fmt::Display for ColorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bw => write!(f, "bw"),
            Self::Color => write!(f, "color"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintType {
    Single,
    Double,
}

impl PrintType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
        }
    }
}

impl fmt::Display for PrintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrintType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            other => Err(PricingError::InvalidPrintType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperSize {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorClass {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ColorKind,
}

/// Upper bound of a tier.
///
/// Serialized as an integer, or `null` for the open-ended tail tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum TierBound {
    Bounded(u32),
    Unbounded,
}

impl TierBound {
    pub fn contains(&self, quantity: u64) -> bool {
        match self {
            Self::Bounded(max) => quantity <= u64::from(*max),
            Self::Unbounded => true,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl From<Option<u32>> for TierBound {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Self::Unbounded, Self::Bounded)
    }
}

impl From<TierBound> for Option<u32> {
    fn from(value: TierBound) -> Self {
        match value {
            TierBound::Bounded(max) => Some(max),
            TierBound::Unbounded => None,
        }
    }
}

impl fmt::Display for TierBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => write!(f, "{}", max),
            Self::Unbounded => write!(f, "∞"),
        }
    }
}

/// A contiguous quantity band with its per-sheet prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub min: u32,
    #[serde(default = "unbounded")]
    pub max: TierBound,
    pub single: u64,
    pub double: u64,
}

fn unbounded() -> TierBound {
    TierBound::Unbounded
}

impl Tier {
    /// Both ends are inclusive
    pub fn contains(&self, quantity: u64) -> bool {
        quantity >= u64::from(self.min) && self.max.contains(quantity)
    }

    pub fn price_for(&self, print_type: PrintType) -> u64 {
        match print_type {
            PrintType::Single => self.single,
            PrintType::Double => self.double,
        }
    }
}

/// Unvalidated tier as submitted by an operator or read from a file.
///
/// Signed so that negative input can be reported rather than rejected by the
/// deserializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDraft {
    pub min: i64,
    #[serde(default)]
    pub max: Option<i64>,
    pub single: i64,
    pub double: i64,
}

impl From<Tier> for TierDraft {
    fn from(tier: Tier) -> Self {
        Self {
            min: i64::from(tier.min),
            max: Option::<u32>::from(tier.max).map(i64::from),
            single: price_to_draft(tier.single),
            double: price_to_draft(tier.double),
        }
    }
}

/// Draft form of a stored price.
///
/// Stored prices were validated from `i64` input, so the clamp never triggers
/// for a committed table.
pub(crate) fn price_to_draft(price: u64) -> i64 {
    i64::try_from(price).unwrap_or(i64::MAX)
}

/// Tier list that passed validation; the only form the resolver accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TierTable(Vec<Tier>);

impl TierTable {
    pub(crate) fn new_unchecked(tiers: Vec<Tier>) -> Self {
        Self(tiers)
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Optional flat-fee add-on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub label: String,
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<u32>,
}

impl Service {
    /// Cost for a job of `quantity` sheets; zero while below the gate
    pub fn cost_for(&self, quantity: u64) -> u64 {
        match self.min_quantity {
            Some(min) if quantity < u64::from(min) => 0,
            _ => self.price,
        }
    }
}

/// Unvalidated service record from the admin path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDraft {
    pub id: String,
    pub label: String,
    pub price: i64,
    #[serde(default)]
    pub min_quantity: Option<i64>,
}

/// One calculation request, in the shape the UI sends it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRequest {
    pub color_class: String,
    pub print_type: String,
    pub pages: u32,
    pub copies: u32,
    #[serde(default = "no_service")]
    pub service: String,
}

fn no_service() -> String {
    NO_SERVICE.to_string()
}

impl PriceRequest {
    pub fn new(
        color_class: impl Into<String>,
        print_type: impl Into<String>,
        pages: u32,
        copies: u32,
    ) -> Self {
        Self {
            color_class: color_class.into(),
            print_type: print_type.into(),
            pages,
            copies,
            service: no_service(),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }
}

/// Result of pricing one configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Per-sheet price from the matching tier
    pub unit_price: u64,
    /// pages * copies
    pub quantity: u64,
    /// unit_price * pages
    pub copy_price: u64,
    pub service_cost: u64,
    pub total_price: u64,
}

impl PriceBreakdown {
    pub fn zero() -> Self {
        Self::default()
    }
}
