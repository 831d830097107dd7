//! Page cache invalidation on roster changes.

use leseohren_core::error::RegistryResult;
use leseohren_core::events::{RosterChanged, RosterListener};
use tracing::{debug, warn};
use uuid::Uuid;

/// Cache backend that can drop every entry carrying a tag.
pub trait TaggedCache: Send + Sync {
    fn flush_by_tag(&self, tag: &str) -> impl Future<Output = RegistryResult<()>> + Send;
}

/// Flushes rendered pages that show an organization's roster.
pub struct PageCacheInvalidator<C: TaggedCache> {
    cache: C,
    show_page_id: Option<u64>,
}

impl<C: TaggedCache> PageCacheInvalidator<C> {
    pub fn new(cache: C, show_page_id: Option<u64>) -> Self {
        Self {
            cache,
            show_page_id,
        }
    }

    /// Tags to flush for a change of `organization_id`'s roster.
    pub fn tags(&self, organization_id: Uuid) -> Vec<String> {
        let mut tags = vec![format!("organization_{organization_id}")];
        if let Some(page_id) = self.show_page_id {
            tags.push(format!("pageId_{page_id}"));
        }
        tags
    }
}

impl<C: TaggedCache> RosterListener for PageCacheInvalidator<C> {
    async fn on_roster_changed(&self, event: RosterChanged) {
        for tag in self.tags(event.organization_id) {
            match self.cache.flush_by_tag(&tag).await {
                Ok(()) => debug!(%tag, "Flushed page cache"),
                Err(e) => warn!(%tag, error = %e, "Page cache flush failed"),
            }
        }
    }
}
