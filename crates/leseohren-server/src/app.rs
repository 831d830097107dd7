//! Wiring of the registry services on top of a SurrealDB connection.

use std::sync::Arc;

use chrono::NaiveDate;
use leseohren_core::error::RegistryResult;
use leseohren_db::repository::{
    SurrealCategoryRepository, SurrealDocumentRepository, SurrealEventRepository,
    SurrealOrganizationRepository, SurrealPersonRepository,
};
use leseohren_registry::{
    AssignmentService, CategoryFilter, DocumentService, EventService, LocalFileStorage,
    PageCacheInvalidator, RecordService, RegistryConfig, TaggedCache,
};
use surrealdb::{Connection, Surreal};
use tracing::info;

/// Cache backend for deployments without a page cache: flushes are only
/// logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyCache;

impl TaggedCache for LogOnlyCache {
    async fn flush_by_tag(&self, tag: &str) -> RegistryResult<()> {
        info!(tag, "Page cache flush requested");
        Ok(())
    }
}

pub type Invalidator = Arc<PageCacheInvalidator<LogOnlyCache>>;

/// Counts logged once the services are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupSummary {
    pub categories: usize,
    pub volunteer_candidates: usize,
    pub upcoming_events: usize,
}

/// All registry services sharing one database connection.
pub struct Registry<C: Connection> {
    pub assignments: AssignmentService<SurrealOrganizationRepository<C>, Invalidator>,
    pub categories: CategoryFilter<
        SurrealPersonRepository<C>,
        SurrealOrganizationRepository<C>,
        SurrealCategoryRepository<C>,
    >,
    pub documents:
        DocumentService<SurrealPersonRepository<C>, SurrealDocumentRepository<C>, LocalFileStorage>,
    pub events: EventService<SurrealEventRepository<C>>,
    pub records: RecordService<
        SurrealPersonRepository<C>,
        SurrealOrganizationRepository<C>,
        SurrealCategoryRepository<C>,
        SurrealDocumentRepository<C>,
        LocalFileStorage,
        Invalidator,
    >,
}

impl<C: Connection> Registry<C> {
    pub fn new(db: &Surreal<C>, config: &RegistryConfig) -> Self {
        let invalidator = Arc::new(PageCacheInvalidator::new(
            LogOnlyCache,
            config.organization_show_page_id,
        ));
        let storage = LocalFileStorage::new(&config.storage_root);
        let documents = || {
            DocumentService::new(
                SurrealPersonRepository::new(db.clone()),
                SurrealDocumentRepository::new(db.clone()),
                storage.clone(),
            )
        };

        Self {
            assignments: AssignmentService::new(
                SurrealOrganizationRepository::new(db.clone()),
                invalidator.clone(),
            ),
            categories: CategoryFilter::new(
                SurrealPersonRepository::new(db.clone()),
                SurrealOrganizationRepository::new(db.clone()),
                SurrealCategoryRepository::new(db.clone()),
                config.clone(),
            ),
            documents: documents(),
            events: EventService::new(SurrealEventRepository::new(db.clone())),
            records: RecordService::new(
                SurrealPersonRepository::new(db.clone()),
                SurrealOrganizationRepository::new(db.clone()),
                SurrealCategoryRepository::new(db.clone()),
                documents(),
                invalidator,
            ),
        }
    }

    /// Reads the category tree, the volunteer preset and the calendar.
    /// Unconfigured presets are reported as warnings by the filter.
    pub async fn startup_summary(&self, today: NaiveDate) -> RegistryResult<StartupSummary> {
        Ok(StartupSummary {
            categories: self.records.list_categories().await?.len(),
            volunteer_candidates: self.categories.volunteer_candidates().await?.len(),
            upcoming_events: self.events.upcoming(today).await?.len(),
        })
    }
}
