//! Cart line items and order totals.

use crate::error::PricingError;
use crate::pricing::{calculate_price, PriceBreakdown, PriceRequest, PricingCatalog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// A priced print-job configuration.
///
/// Fields are read-only; a changed configuration is priced again and swapped
/// in as a new item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    id: Uuid,
    request: PriceRequest,
    breakdown: PriceBreakdown,
    catalog_version: u64,
    notes: Option<String>,
}

impl LineItem {
    /// Price a request and capture the result as a new line item
    pub fn price(
        catalog: &PricingCatalog,
        request: PriceRequest,
        notes: Option<String>,
    ) -> Result<Self, PricingError> {
        let breakdown = calculate_price(catalog, &request)?;
        Ok(Self {
            id: Uuid::new_v4(),
            request,
            breakdown,
            catalog_version: catalog.version,
            notes,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &PriceRequest {
        &self.request
    }

    pub fn breakdown(&self) -> &PriceBreakdown {
        &self.breakdown
    }

    pub fn total_price(&self) -> u64 {
        self.breakdown.total_price
    }

    /// Catalog version the item was priced against
    pub fn catalog_version(&self) -> u64 {
        self.catalog_version
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Item count and summed total of a set of line items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub count: usize,
    pub total: u64,
}

/// Fold line items into a summary; order of the items does not matter.
///
/// The total saturates at `u64::MAX` instead of wrapping.
pub fn aggregate<'a, I>(items: I) -> OrderSummary
where
    I: IntoIterator<Item = &'a LineItem>,
{
    items
        .into_iter()
        .fold(OrderSummary::default(), |acc, item| OrderSummary {
            count: acc.count + 1,
            total: acc.total.saturating_add(item.total_price()),
        })
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Cart is empty")]
    Empty,

    #[error("Line item not found: {0}")]
    ItemNotFound(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Later states belong to the persistence layer
    Pending,
}

/// Order produced at checkout, ready for the persistence layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub id: Uuid,
    pub items: Vec<LineItem>,
    pub total_amount: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Session cart; its totals are always derived from the items
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: LineItem) -> OrderSummary {
        self.items.push(item);
        self.summary()
    }

    pub fn remove(&mut self, id: Uuid) -> Result<LineItem, CartError> {
        let index = self.position(id)?;
        Ok(self.items.remove(index))
    }

    /// Swap an item for a freshly priced one, keeping its position
    pub fn replace(&mut self, id: Uuid, item: LineItem) -> Result<LineItem, CartError> {
        let index = self.position(id)?;
        Ok(std::mem::replace(&mut self.items[index], item))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn summary(&self) -> OrderSummary {
        aggregate(&self.items)
    }

    /// Turn the cart into a pending order and empty it
    pub fn checkout(&mut self) -> Result<OrderDraft, CartError> {
        if self.items.is_empty() {
            return Err(CartError::Empty);
        }

        let items = std::mem::take(&mut self.items);
        let summary = aggregate(&items);
        let order = OrderDraft {
            id: Uuid::new_v4(),
            items,
            total_amount: summary.total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        info!(order_id = %order.id, items = summary.count, total = summary.total, "Cart checked out");
        Ok(order)
    }

    fn position(&self, id: Uuid) -> Result<usize, CartError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CartError::ItemNotFound(id))
    }
}
