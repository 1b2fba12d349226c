use crate::error::AppError;
use crate::metrics;
use crate::pricing::catalog::PricingCatalog;
use crate::pricing::models::{ServiceDraft, TierDraft};
use crate::pricing::validator::{validate_service, validate_tier_table_for};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    TierUpdate,
    ServiceUpdate,
    ServiceRemoval,
    CatalogReplace,
}

/// One committed admin write
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    pub target: String,
    pub actor: String,
    pub version: u64,
    pub at: DateTime<Utc>,
}

/// Owner of the live pricing catalog.
///
/// Readers take an `Arc` snapshot that never changes under them. Writers are
/// serialized, validate first, and publish a whole new snapshot atomically,
/// so a reader sees either the table before an edit or the table after it.
pub struct PricingStore {
    current: ArcSwap<PricingCatalog>,
    history: Mutex<VecDeque<ChangeRecord>>,
    history_limit: usize,
}

impl PricingStore {
    pub fn new(catalog: PricingCatalog) -> Self {
        Self::with_history_limit(catalog, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(catalog: PricingCatalog, history_limit: usize) -> Self {
        Self {
            current: ArcSwap::from_pointee(catalog),
            history: Mutex::new(VecDeque::new()),
            history_limit: history_limit.max(1),
        }
    }

    pub fn builtin() -> Result<Self, AppError> {
        Ok(Self::new(PricingCatalog::builtin()?))
    }

    pub fn snapshot(&self) -> Arc<PricingCatalog> {
        self.current.load_full()
    }

    pub fn version(&self) -> u64 {
        self.current.load().version
    }

    /// Replace the tier table of one color class.
    ///
    /// The whole edit is rejected if any rule fails; the committed table is
    /// left untouched.
    pub fn update_tiers(
        &self,
        color_class: &str,
        drafts: &[TierDraft],
        actor: &str,
    ) -> Result<u64, AppError> {
        let mut history = self.lock_history();
        let current = self.current.load_full();

        if current.tiers_for(color_class).is_none() {
            metrics::record_table_write("rejected");
            return Err(AppError::UnknownColorClass(color_class.to_string()));
        }

        let table = match validate_tier_table_for(color_class, drafts) {
            Ok(table) => table,
            Err(e) => {
                warn!(color_class, actor, "Tier table update rejected: {}", e);
                metrics::record_table_write("rejected");
                return Err(e);
            }
        };

        let next = current.with_tiers(color_class, table);
        Ok(self.commit(&mut history, next, ChangeKind::TierUpdate, color_class, actor))
    }

    /// Insert or replace a service
    pub fn upsert_service(&self, draft: &ServiceDraft, actor: &str) -> Result<u64, AppError> {
        let mut history = self.lock_history();

        let service = validate_service(draft).inspect_err(|e| {
            warn!(service = %draft.id, actor, "Service update rejected: {}", e);
            metrics::record_table_write("rejected");
        })?;

        let target = service.id.clone();
        let next = self.current.load().with_service(service);
        Ok(self.commit(&mut history, next, ChangeKind::ServiceUpdate, &target, actor))
    }

    pub fn remove_service(&self, id: &str, actor: &str) -> Result<u64, AppError> {
        let mut history = self.lock_history();
        let current = self.current.load_full();

        if current.service(id).is_none() {
            metrics::record_table_write("rejected");
            return Err(AppError::UnknownService(id.to_string()));
        }

        let next = current.without_service(id);
        Ok(self.commit(&mut history, next, ChangeKind::ServiceRemoval, id, actor))
    }

    /// Swap in a whole catalog, e.g. after reloading the catalog file.
    ///
    /// The incoming catalog is already validated by construction; its version
    /// is renumbered to follow the current one.
    pub fn replace_catalog(&self, catalog: PricingCatalog, actor: &str) -> u64 {
        let mut history = self.lock_history();
        let next = catalog.with_version(self.version() + 1);
        self.commit(&mut history, next, ChangeKind::CatalogReplace, "*", actor)
    }

    /// Most recent changes first
    pub fn history(&self, limit: usize) -> Vec<ChangeRecord> {
        self.lock_history().iter().take(limit).cloned().collect()
    }

    fn commit(
        &self,
        history: &mut VecDeque<ChangeRecord>,
        next: PricingCatalog,
        kind: ChangeKind,
        target: &str,
        actor: &str,
    ) -> u64 {
        let version = next.version;
        self.current.store(Arc::new(next));

        history.push_front(ChangeRecord {
            kind,
            target: target.to_string(),
            actor: actor.to_string(),
            version,
            at: Utc::now(),
        });
        history.truncate(self.history_limit);

        metrics::record_table_write("committed");
        info!(?kind, changed = target, actor, version, "Pricing catalog updated");
        version
    }

    // Also serializes writers
    fn lock_history(&self) -> MutexGuard<'_, VecDeque<ChangeRecord>> {
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
