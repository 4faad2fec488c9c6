//! Relation manager.
//!
//! `MarkService` pairs a [`RelationStore`] with a frozen
//! [`CapabilityRegistry`]. Every mutating or marker-filtered operation runs
//! the authorization resolver first; a rejected request never reaches the
//! store. There is no cache: each call re-queries the store.
//!
//! Operations are split across `impl MarkService` blocks in
//! [`crate::repos`].

use std::sync::Arc;

use mark_config::{MarkConfig, ReclaimConfig};
use mark_core::CapabilityRegistry;

use crate::MarkDb;
use crate::error::DatabaseError;
use crate::scan::DEFAULT_PAGE_SIZE;
use crate::store::RelationStore;

pub struct MarkService<S = MarkDb> {
    store: S,
    registry: Arc<CapabilityRegistry>,
    page_size: u32,
    log_every: u64,
}

impl MarkService<MarkDb> {
    /// Create a service over a local libSQL database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str, registry: Arc<CapabilityRegistry>) -> Result<Self, DatabaseError> {
        let db = MarkDb::open_local(db_path).await?;
        Ok(Self::new(db, registry))
    }

    /// Open the configured database and register the configured entity types.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn from_config(config: &MarkConfig) -> Result<Self, DatabaseError> {
        let registry = config.entities.build_registry().into_shared();
        let service = Self::new_local(&config.database.path, registry).await?;
        Ok(service.with_reclaim_config(&config.reclaim))
    }
}

impl<S: RelationStore> MarkService<S> {
    #[must_use]
    pub const fn new(store: S, registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            store,
            registry,
            page_size: DEFAULT_PAGE_SIZE,
            log_every: 0,
        }
    }

    /// Apply scan page size and progress logging from configuration.
    #[must_use]
    pub fn with_reclaim_config(mut self, config: &ReclaimConfig) -> Self {
        self.page_size = config.page_size.max(1);
        self.log_every = config.log_every;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    #[must_use]
    pub fn shared_registry(&self) -> Arc<CapabilityRegistry> {
        Arc::clone(&self.registry)
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    pub(crate) const fn log_every(&self) -> u64 {
        self.log_every
    }
}
