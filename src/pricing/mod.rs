pub mod calculator;
pub mod catalog;
pub mod loader;
pub mod models;
pub mod resolver;
pub mod store;
pub mod validator;

pub use calculator::{calculate_price, PriceCalculator};
pub use catalog::{CatalogFile, PricingCatalog};
pub use loader::{load_catalog_file, parse_catalog_json, parse_catalog_toml};
pub use models::{
    ColorClass, ColorKind, PriceBreakdown, PriceRequest, PrintType, Service, ServiceDraft, Tier,
    TierBound, TierDraft, TierTable, NO_SERVICE,
};
pub use resolver::resolve_tier;
pub use store::{ChangeKind, ChangeRecord, PricingStore};
pub use validator::{validate_service, validate_tier_table, validate_tier_table_for};
