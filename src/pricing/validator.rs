//! Tier table and service validation.
//!
//! Every write into the pricing catalog goes through here. A table that
//! passes is converted into a [`TierTable`], which is the only type the
//! resolver accepts.

use crate::error::{AppError, PriceField, TierViolation};
use crate::pricing::models::{Service, ServiceDraft, Tier, TierBound, TierDraft, TierTable, NO_SERVICE};

/// Check a candidate tier list and convert it into a validated table.
///
/// Reports every violation found, not just the first one.
pub fn validate_tier_table(drafts: &[TierDraft]) -> Result<TierTable, Vec<TierViolation>> {
    let mut violations = Vec::new();

    if drafts.is_empty() {
        return Err(vec![TierViolation::EmptyTable]);
    }

    if drafts[0].min != 1 {
        violations.push(TierViolation::FirstTierNotAtOne { found: drafts[0].min });
    }

    for (index, tier) in drafts.iter().enumerate() {
        if index > 0 && tier.min < 1 {
            violations.push(TierViolation::MinBelowOne { index, min: tier.min });
        }
        if tier.min > i64::from(u32::MAX) {
            violations.push(TierViolation::BoundOutOfRange { index, value: tier.min });
        }
        if let Some(max) = tier.max {
            if max < tier.min {
                violations.push(TierViolation::MaxNotGreaterThanMin { index });
            }
            if max > i64::from(u32::MAX) {
                violations.push(TierViolation::BoundOutOfRange { index, value: max });
            }
        }
        if tier.single < 0 {
            violations.push(TierViolation::NegativePrice { index, field: PriceField::Single });
        }
        if tier.double < 0 {
            violations.push(TierViolation::NegativePrice { index, field: PriceField::Double });
        }
    }

    for (index, pair) in drafts.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        let next_index = index + 1;

        if next.min <= prev.min {
            violations.push(TierViolation::UnsortedTiers { index: next_index });
            continue;
        }

        match prev.max {
            None => violations.push(TierViolation::UnboundedNotLast { index }),
            Some(prev_max) if next.min > prev_max.saturating_add(1) => {
                violations.push(TierViolation::GapBetweenTiers { after_index: index })
            }
            Some(prev_max) if next.min <= prev_max => {
                violations.push(TierViolation::OverlappingTiers { index: next_index })
            }
            Some(_) => {}
        }
    }

    if drafts.last().is_some_and(|tail| tail.max.is_some()) {
        violations.push(TierViolation::MissingUnboundedTail);
    }

    if !violations.is_empty() {
        return Err(violations);
    }

    let tiers = drafts
        .iter()
        .map(|draft| Tier {
            min: draft.min as u32,
            max: draft.max.map_or(TierBound::Unbounded, |max| TierBound::Bounded(max as u32)),
            single: draft.single as u64,
            double: draft.double as u64,
        })
        .collect();

    Ok(TierTable::new_unchecked(tiers))
}

/// Validate the tier list of one color class, naming it in the error
pub fn validate_tier_table_for(color_class: &str, drafts: &[TierDraft]) -> Result<TierTable, AppError> {
    validate_tier_table(drafts).map_err(|violations| AppError::TierTableInvalid {
        color_class: color_class.to_string(),
        violations,
    })
}

/// Check a service record from the admin path
pub fn validate_service(draft: &ServiceDraft) -> Result<Service, AppError> {
    let invalid = |reason: &str| AppError::InvalidService {
        id: draft.id.clone(),
        reason: reason.to_string(),
    };

    if draft.id.trim().is_empty() {
        return Err(invalid("id must not be empty"));
    }
    if draft.id == NO_SERVICE {
        return Err(invalid("'none' is reserved for no service"));
    }
    if draft.label.trim().is_empty() {
        return Err(invalid("label must not be empty"));
    }
    if draft.price < 0 {
        return Err(invalid("price must not be negative"));
    }

    let min_quantity = match draft.min_quantity {
        None => None,
        Some(min) if (1..=i64::from(u32::MAX)).contains(&min) => Some(min as u32),
        Some(_) => return Err(invalid("min_quantity must be at least 1")),
    };

    Ok(Service {
        id: draft.id.clone(),
        label: draft.label.clone(),
        price: draft.price as u64,
        min_quantity,
    })
}
