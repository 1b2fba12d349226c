use crate::pricing::catalog::PricingCatalog;
use crate::pricing::models::{Tier, TierTable};

/// Find the tier covering `quantity` for a color class.
///
/// Returns `None` for an unknown color class or a quantity of zero; callers
/// treat that as "price unknown".
pub fn resolve_tier<'a>(
    catalog: &'a PricingCatalog,
    color_class: &str,
    quantity: u64,
) -> Option<&'a Tier> {
    let table = catalog.tiers_for(color_class)?;
    find_tier(table, quantity)
}

/// Linear scan; tables are a handful of tiers long
pub fn find_tier(table: &TierTable, quantity: u64) -> Option<&Tier> {
    if quantity == 0 {
        return None;
    }
    table.tiers().iter().find(|tier| tier.contains(quantity))
}

/// Binary search over the sorted, contiguous table
pub fn find_tier_sorted(table: &TierTable, quantity: u64) -> Option<&Tier> {
    if quantity == 0 {
        return None;
    }
    let tiers = table.tiers();
    let idx = tiers.partition_point(|tier| u64::from(tier.min) <= quantity);
    idx.checked_sub(1)
        .map(|i| &tiers[i])
        .filter(|tier| tier.contains(quantity))
}
