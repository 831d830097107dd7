//! Roster change notifications.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitted once per successful change of an organization's volunteer roster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RosterChanged {
    pub organization_id: Uuid,
}

/// Subscriber for roster changes (e.g. a page cache invalidator).
///
/// Listeners own their failure handling; nothing is reported back to the
/// emitting operation.
pub trait RosterListener: Send + Sync {
    fn on_roster_changed(&self, event: RosterChanged) -> impl Future<Output = ()> + Send;
}

impl<T: RosterListener> RosterListener for std::sync::Arc<T> {
    fn on_roster_changed(&self, event: RosterChanged) -> impl Future<Output = ()> + Send {
        (**self).on_roster_changed(event)
    }
}
