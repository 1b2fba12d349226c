use crate::error::PricingError;
use crate::metrics;
use crate::pricing::catalog::PricingCatalog;
use crate::pricing::models::{PriceBreakdown, PriceRequest, PrintType, NO_SERVICE};
use crate::pricing::resolver::resolve_tier;
use crate::pricing::store::PricingStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Price one configuration against a catalog snapshot.
///
/// Pure: reads the snapshot, mutates nothing.
pub fn calculate_price(
    catalog: &PricingCatalog,
    request: &PriceRequest,
) -> Result<PriceBreakdown, PricingError> {
    let invalid_quantity = || PricingError::InvalidQuantity {
        pages: request.pages,
        copies: request.copies,
    };

    if request.pages < 1 || request.copies < 1 {
        return Err(invalid_quantity());
    }
    let quantity = u64::from(request.pages) * u64::from(request.copies);

    let tier = resolve_tier(catalog, &request.color_class, quantity).ok_or_else(|| {
        PricingError::NoPricingTier {
            color_class: request.color_class.clone(),
            quantity,
        }
    })?;

    let print_type: PrintType = request.print_type.parse()?;
    if let Some(class) = catalog.color_class(&request.color_class) {
        if !catalog.offers(class.kind, print_type) {
            return Err(PricingError::InvalidPrintType(format!(
                "{} is not offered for {} paper",
                print_type, class.kind
            )));
        }
    }
    let unit_price = tier.price_for(print_type);

    let service_cost = if request.service == NO_SERVICE {
        0
    } else {
        catalog
            .service(&request.service)
            .ok_or_else(|| PricingError::UnknownService(request.service.clone()))?
            .cost_for(quantity)
    };

    let copy_price = unit_price
        .checked_mul(u64::from(request.pages))
        .ok_or_else(invalid_quantity)?;
    let total_price = copy_price
        .checked_mul(u64::from(request.copies))
        .and_then(|sheets| sheets.checked_add(service_cost))
        .ok_or_else(invalid_quantity)?;

    Ok(PriceBreakdown {
        unit_price,
        quantity,
        copy_price,
        service_cost,
        total_price,
    })
}

/// Calculator bound to the live pricing store
#[derive(Clone)]
pub struct PriceCalculator {
    store: Arc<PricingStore>,
}

impl PriceCalculator {
    pub fn new(store: Arc<PricingStore>) -> Self {
        Self { store }
    }

    /// Calculate against the snapshot current at call time
    pub fn calculate(&self, request: &PriceRequest) -> Result<PriceBreakdown, PricingError> {
        let snapshot = self.store.snapshot();
        let result = calculate_price(&snapshot, request);

        match &result {
            Ok(breakdown) => {
                debug!(
                    color_class = %request.color_class,
                    quantity = breakdown.quantity,
                    total = breakdown.total_price,
                    catalog_version = snapshot.version,
                    "Price calculated"
                );
                metrics::record_quote("priced");
            }
            Err(PricingError::InvalidPrintType(detail)) => {
                warn!(
                    color_class = %request.color_class,
                    "Rejected print type reached the calculator: {}", detail
                );
                metrics::record_quote("invalid_print_type");
            }
            Err(e) => {
                debug!(color_class = %request.color_class, "Price unavailable: {}", e);
                metrics::record_quote(e.kind());
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::ColorKind;

    fn catalog() -> PricingCatalog {
        PricingCatalog::builtin().unwrap()
    }

    #[test]
    fn test_print_type_not_offered_for_color_kind() {
        let mut file = crate::pricing::CatalogFile::builtin();
        file.print_types.insert(ColorKind::Bw, vec![PrintType::Single]);
        let catalog = file.into_catalog().unwrap();

        let err = calculate_price(&catalog, &PriceRequest::new("a4_bw_simple", "double", 1, 10))
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidPrintType(_)));

        // Single is still offered, and color classes keep both
        assert!(calculate_price(&catalog, &PriceRequest::new("a4_bw_simple", "single", 1, 10)).is_ok());
        assert!(calculate_price(&catalog, &PriceRequest::new("a4_color_80", "double", 1, 10)).is_ok());
    }

    #[test]
    fn test_lower_tier_price() {
        let breakdown =
            calculate_price(&catalog(), &PriceRequest::new("a4_bw_simple", "single", 1, 499))
                .unwrap();
        assert_eq!(breakdown.unit_price, 1190);
        assert_eq!(breakdown.quantity, 499);
        assert_eq!(breakdown.copy_price, 1190);
        assert_eq!(breakdown.service_cost, 0);
        assert_eq!(breakdown.total_price, 1190 * 499);
    }

    #[test]
    fn test_quantity_crosses_into_next_tier() {
        let breakdown =
            calculate_price(&catalog(), &PriceRequest::new("a4_bw_simple", "single", 1, 500))
                .unwrap();
        assert_eq!(breakdown.unit_price, 990);
        assert_eq!(breakdown.total_price, 990 * 500);
    }

    #[test]
    fn test_pages_scale_the_copy_price() {
        let breakdown =
            calculate_price(&catalog(), &PriceRequest::new("a4_color_80", "double", 10, 20))
                .unwrap();
        // 200 sheets falls in [100, 499]
        assert_eq!(breakdown.unit_price, 8500);
        assert_eq!(breakdown.copy_price, 85_000);
        assert_eq!(breakdown.total_price, 85_000 * 20);
    }

    #[test]
    fn test_service_applies_at_min_quantity() {
        let request = PriceRequest::new("a4_bw_simple", "single", 10, 60).with_service("sticker");
        let breakdown = calculate_price(&catalog(), &request).unwrap();
        assert_eq!(breakdown.quantity, 600);
        assert_eq!(breakdown.service_cost, 500);
        assert_eq!(breakdown.total_price, 990 * 10 * 60 + 500);
    }

    #[test]
    fn test_service_is_free_below_min_quantity() {
        let request = PriceRequest::new("a4_bw_simple", "single", 4, 100).with_service("sticker");
        let breakdown = calculate_price(&catalog(), &request).unwrap();
        assert_eq!(breakdown.quantity, 400);
        assert_eq!(breakdown.service_cost, 0);
        assert_eq!(breakdown.total_price, 1190 * 4 * 100);
    }

    #[test]
    fn test_service_cost_is_not_multiplied_by_copies() {
        let request = PriceRequest::new("a5_color_glossy", "single", 1, 3).with_service("hotglue");
        let breakdown = calculate_price(&catalog(), &request).unwrap();
        assert_eq!(breakdown.total_price, 8000 * 3 + 15000);
    }

    #[test]
    fn test_invalid_quantity() {
        let err = calculate_price(&catalog(), &PriceRequest::new("a4_bw_simple", "single", 0, 5))
            .unwrap_err();
        assert_eq!(err, PricingError::InvalidQuantity { pages: 0, copies: 5 });

        let err = calculate_price(&catalog(), &PriceRequest::new("a4_bw_simple", "single", 5, 0))
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_quantity");
    }

    #[test]
    fn test_unknown_color_class() {
        let err = calculate_price(&catalog(), &PriceRequest::new("a0_gold", "single", 1, 1))
            .unwrap_err();
        assert_eq!(
            err,
            PricingError::NoPricingTier {
                color_class: "a0_gold".to_string(),
                quantity: 1
            }
        );
    }

    #[test]
    fn test_invalid_print_type() {
        let err = calculate_price(&catalog(), &PriceRequest::new("a4_bw_simple", "triple", 1, 1))
            .unwrap_err();
        assert_eq!(err, PricingError::InvalidPrintType("triple".to_string()));
    }

    #[test]
    fn test_unknown_service() {
        let request = PriceRequest::new("a4_bw_simple", "single", 1, 1).with_service("laminate");
        let err = calculate_price(&catalog(), &request).unwrap_err();
        assert_eq!(err, PricingError::UnknownService("laminate".to_string()));
    }

    #[test]
    fn test_calculator_reads_current_snapshot() {
        let store = Arc::new(PricingStore::builtin().unwrap());
        let calculator = PriceCalculator::new(store);
        let breakdown = calculator
            .calculate(&PriceRequest::new("a3_color_glossy_250", "double", 2, 2))
            .unwrap();
        assert_eq!(breakdown.total_price, 68000 * 2 * 2);
    }
}
