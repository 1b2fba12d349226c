use crate::error::AppError;
use crate::pricing::models::{
    price_to_draft, ColorClass, ColorKind, PaperSize, PrintType, Service, ServiceDraft, TierDraft,
    TierTable,
};
use crate::pricing::validator::{validate_service, validate_tier_table_for};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Immutable pricing snapshot consumed by the calculator.
///
/// Never mutated in place: every admin write produces a new snapshot with a
/// higher `version`.
#[derive(Debug, Clone)]
pub struct PricingCatalog {
    pub version: u64,
    pub updated_at: DateTime<Utc>,
    paper_sizes: Vec<PaperSize>,
    color_classes: BTreeMap<String, Vec<ColorClass>>,
    print_types: HashMap<ColorKind, Vec<PrintType>>,
    services: Vec<Service>,
    tiers: HashMap<String, TierTable>,
}

impl PricingCatalog {
    /// Standard A3/A4/A5 tables and services
    pub fn builtin() -> Result<Self, AppError> {
        CatalogFile::builtin().into_catalog()
    }

    pub fn paper_sizes(&self) -> &[PaperSize] {
        &self.paper_sizes
    }

    /// Color classes offered for a paper size
    pub fn color_classes_for(&self, paper_size: &str) -> &[ColorClass] {
        self.color_classes
            .get(paper_size)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn color_class(&self, id: &str) -> Option<&ColorClass> {
        self.color_classes.values().flatten().find(|c| c.id == id)
    }

    pub fn color_class_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tiers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Whether `print_type` may be used with a color class of `kind`
    pub fn offers(&self, kind: ColorKind, print_type: PrintType) -> bool {
        self.print_types
            .get(&kind)
            .is_some_and(|types| types.contains(&print_type))
    }

    pub fn tiers_for(&self, color_class: &str) -> Option<&TierTable> {
        self.tiers.get(color_class)
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    /// New snapshot with one tier table replaced
    pub(crate) fn with_tiers(&self, color_class: &str, table: TierTable) -> Self {
        let mut next = self.next_version();
        next.tiers.insert(color_class.to_string(), table);
        next
    }

    /// New snapshot with a service inserted or replaced
    pub(crate) fn with_service(&self, service: Service) -> Self {
        let mut next = self.next_version();
        match next.services.iter_mut().find(|s| s.id == service.id) {
            Some(existing) => *existing = service,
            None => next.services.push(service),
        }
        next
    }

    pub(crate) fn without_service(&self, id: &str) -> Self {
        let mut next = self.next_version();
        next.services.retain(|s| s.id != id);
        next
    }

    pub(crate) fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    fn next_version(&self) -> Self {
        let mut next = self.clone();
        next.version = self.version + 1;
        next.updated_at = Utc::now();
        next
    }

    /// Serializable form of this snapshot
    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            paper_sizes: self.paper_sizes.clone(),
            color_classes: self.color_classes.clone(),
            print_types: self.print_types.clone(),
            services: self
                .services
                .iter()
                .map(|s| ServiceDraft {
                    id: s.id.clone(),
                    label: s.label.clone(),
                    price: price_to_draft(s.price),
                    min_quantity: s.min_quantity.map(i64::from),
                })
                .collect(),
            pricing_tiers: self
                .tiers
                .iter()
                .map(|(id, table)| {
                    (id.clone(), table.tiers().iter().copied().map(TierDraft::from).collect())
                })
                .collect(),
        }
    }
}

/// On-disk / wire shape of a catalog before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub paper_sizes: Vec<PaperSize>,
    pub color_classes: BTreeMap<String, Vec<ColorClass>>,
    #[serde(default = "default_print_types")]
    pub print_types: HashMap<ColorKind, Vec<PrintType>>,
    #[serde(default)]
    pub services: Vec<ServiceDraft>,
    pub pricing_tiers: BTreeMap<String, Vec<TierDraft>>,
}

fn default_print_types() -> HashMap<ColorKind, Vec<PrintType>> {
    HashMap::from([
        (ColorKind::Bw, vec![PrintType::Single, PrintType::Double]),
        (ColorKind::Color, vec![PrintType::Single, PrintType::Double]),
    ])
}

impl CatalogFile {
    /// Validate every table and cross reference, producing version 1 of a catalog
    pub fn into_catalog(self) -> Result<PricingCatalog, AppError> {
        let mut seen = HashSet::new();
        for class in self.color_classes.values().flatten() {
            if !seen.insert(class.id.as_str()) {
                return Err(AppError::InvalidCatalog(format!(
                    "color class '{}' is listed twice",
                    class.id
                )));
            }
            if !self.pricing_tiers.contains_key(&class.id) {
                return Err(AppError::InvalidCatalog(format!(
                    "color class '{}' has no tier table",
                    class.id
                )));
            }
        }
        if let Some(orphan) = self.pricing_tiers.keys().find(|id| !seen.contains(id.as_str())) {
            return Err(AppError::InvalidCatalog(format!(
                "tier table '{}' has no color class",
                orphan
            )));
        }

        let mut tiers = HashMap::with_capacity(self.pricing_tiers.len());
        for (id, drafts) in &self.pricing_tiers {
            tiers.insert(id.clone(), validate_tier_table_for(id, drafts)?);
        }

        let mut services: Vec<Service> = Vec::with_capacity(self.services.len());
        for draft in self.services.iter().filter(|d| d.id != crate::pricing::NO_SERVICE) {
            let service = validate_service(draft)?;
            if services.iter().any(|s| s.id == service.id) {
                return Err(AppError::InvalidCatalog(format!(
                    "service '{}' is listed twice",
                    service.id
                )));
            }
            services.push(service);
        }

        Ok(PricingCatalog {
            version: 1,
            updated_at: Utc::now(),
            paper_sizes: self.paper_sizes,
            color_classes: self.color_classes,
            print_types: self.print_types,
            services,
            tiers,
        })
    }

    pub fn builtin() -> Self {
        let paper_sizes = vec![paper("a3", "A3"), paper("a4", "A4"), paper("a5", "A5")];

        let color_classes = BTreeMap::from([
            (
                "a3".to_string(),
                vec![
                    class("a3_bw_simple", "Black & white - standard", ColorKind::Bw),
                    class("a3_bw_medium", "Black & white - premium", ColorKind::Bw),
                    class("a3_color_80", "Color - 80gsm bond", ColorKind::Color),
                    class("a3_color_glossy_200", "Color - glossy up to 200gsm", ColorKind::Color),
                    class("a3_color_glossy_250", "Color - glossy 250gsm", ColorKind::Color),
                ],
            ),
            (
                "a4".to_string(),
                vec![
                    class("a4_bw_simple", "Black & white - standard", ColorKind::Bw),
                    class("a4_bw_medium", "Black & white - premium", ColorKind::Bw),
                    class("a4_color_80", "Color - 80gsm bond", ColorKind::Color),
                    class("a4_color_glossy_135", "Color - glossy 135gsm", ColorKind::Color),
                    class("a4_color_glossy_300", "Color - glossy 300gsm", ColorKind::Color),
                ],
            ),
            (
                "a5".to_string(),
                vec![
                    class("a5_bw_simple", "Black & white - standard", ColorKind::Bw),
                    class("a5_bw_medium", "Black & white - premium", ColorKind::Bw),
                    class("a5_color_80", "Color - 80gsm bond", ColorKind::Color),
                    class("a5_color_glossy", "Color - glossy", ColorKind::Color),
                ],
            ),
        ]);

        let services = vec![
            service("sticker", "Cover sticker (min. 500 sheets)", 500, Some(500)),
            service("hotglue", "Hot glue binding", 15000, None),
            service("hardcover", "Hardcover binding (color)", 45000, None),
            service("shiraze", "Clear cover and spine", 8000, None),
            service("spring_15", "Spiral with 15 micron cover", 6000, None),
            service("spring_400", "Spiral with 400 micron cover", 12000, None),
            service("galing", "Cloth binding (3 working days)", 20000, None),
        ];

        let pricing_tiers = BTreeMap::from([
            tiers("a3_bw_simple", &[(1, Some(499), 2600, 2980), (500, Some(999), 1980, 2800), (1000, None, 1800, 2500)]),
            tiers("a3_bw_medium", &[(1, Some(499), 2800, 3200), (500, Some(999), 2200, 3000), (1000, None, 2000, 2700)]),
            tiers("a3_color_80", &[(1, Some(499), 18000, 35000), (500, Some(999), 16000, 31000), (1000, None, 15000, 29000)]),
            tiers("a3_color_glossy_200", &[(1, None, 30000, 58000)]),
            tiers("a3_color_glossy_250", &[(1, None, 35000, 68000)]),
            tiers("a4_bw_simple", &[(1, Some(499), 1190, 1490), (500, Some(999), 990, 1390), (1000, None, 890, 1190)]),
            tiers("a4_bw_medium", &[(1, Some(499), 1390, 1690), (500, Some(999), 1190, 1590), (1000, None, 1090, 1390)]),
            tiers("a4_color_80", &[(1, Some(99), 5500, 10500), (100, Some(499), 4500, 8500), (500, Some(999), 3500, 6500), (1000, None, 2500, 4500)]),
            tiers("a4_color_glossy_135", &[(1, Some(99), 8000, 15000), (100, None, 7000, 13000)]),
            tiers("a4_color_glossy_300", &[(1, None, 15000, 29000)]),
            tiers("a5_bw_simple", &[(1, Some(499), 790, 890), (500, Some(1000), 750, 850), (1001, None, 690, 790)]),
            tiers("a5_bw_medium", &[(1, Some(499), 990, 1090), (500, Some(1000), 950, 1050), (1001, None, 890, 990)]),
            tiers("a5_color_80", &[(1, Some(99), 3500, 6500), (100, Some(499), 2500, 4500), (500, None, 1500, 2500)]),
            tiers("a5_color_glossy", &[(1, None, 8000, 15000)]),
        ]);

        Self {
            paper_sizes,
            color_classes,
            print_types: default_print_types(),
            services,
            pricing_tiers,
        }
    }
}

fn paper(id: &str, label: &str) -> PaperSize {
    PaperSize {
        id: id.to_string(),
        label: label.to_string(),
    }
}

fn class(id: &str, label: &str, kind: ColorKind) -> ColorClass {
    ColorClass {
        id: id.to_string(),
        label: label.to_string(),
        kind,
    }
}

fn service(id: &str, label: &str, price: i64, min_quantity: Option<i64>) -> ServiceDraft {
    ServiceDraft {
        id: id.to_string(),
        label: label.to_string(),
        price,
        min_quantity,
    }
}

fn tiers(id: &str, rows: &[(i64, Option<i64>, i64, i64)]) -> (String, Vec<TierDraft>) {
    let drafts = rows
        .iter()
        .map(|&(min, max, single, double)| TierDraft {
            min,
            max,
            single,
            double,
        })
        .collect();
    (id.to_string(), drafts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = PricingCatalog::builtin().unwrap();
        assert_eq!(catalog.version, 1);
        assert_eq!(catalog.color_class_ids().len(), 14);
        assert_eq!(catalog.services().len(), 7);
        assert_eq!(catalog.color_classes_for("a4").len(), 5);
        assert!(catalog.color_classes_for("a0").is_empty());
    }

    #[test]
    fn test_builtin_catalog_has_no_none_service() {
        let catalog = PricingCatalog::builtin().unwrap();
        assert!(catalog.service(crate::pricing::NO_SERVICE).is_none());
        assert_eq!(catalog.service("sticker").unwrap().min_quantity, Some(500));
    }

    #[test]
    fn test_print_type_offers() {
        let catalog = PricingCatalog::builtin().unwrap();
        assert!(catalog.offers(ColorKind::Bw, PrintType::Double));
        assert!(catalog.offers(ColorKind::Color, PrintType::Single));
    }

    #[test]
    fn test_catalog_rejects_orphan_tier_table() {
        let mut file = CatalogFile::builtin();
        file.pricing_tiers.insert(
            "a6_bw_simple".to_string(),
            vec![TierDraft { min: 1, max: None, single: 500, double: 600 }],
        );
        let err = file.into_catalog().unwrap_err();
        assert!(err.to_string().contains("a6_bw_simple"));
    }

    #[test]
    fn test_catalog_rejects_invalid_table() {
        let mut file = CatalogFile::builtin();
        file.pricing_tiers.insert(
            "a4_bw_simple".to_string(),
            vec![TierDraft { min: 1, max: Some(499), single: 1190, double: 1490 }],
        );
        assert!(matches!(
            file.into_catalog(),
            Err(AppError::TierTableInvalid { .. })
        ));
    }

    #[test]
    fn test_with_tiers_bumps_version_and_keeps_previous() {
        let catalog = PricingCatalog::builtin().unwrap();
        let table = validate_tier_table_for(
            "a4_bw_simple",
            &[TierDraft { min: 1, max: None, single: 1000, double: 1200 }],
        )
        .unwrap();
        let next = catalog.with_tiers("a4_bw_simple", table);

        assert_eq!(next.version, 2);
        assert_eq!(next.tiers_for("a4_bw_simple").unwrap().len(), 1);
        assert_eq!(catalog.tiers_for("a4_bw_simple").unwrap().len(), 3);
    }

    #[test]
    fn test_to_file_round_trips_through_validation() {
        let catalog = PricingCatalog::builtin().unwrap();
        let rebuilt = catalog.to_file().into_catalog().unwrap();
        assert_eq!(rebuilt.color_class_ids(), catalog.color_class_ids());
        assert_eq!(rebuilt.services(), catalog.services());
    }
}
