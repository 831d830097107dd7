//! Leseohren Registry: volunteer roster assignment, category filtering,
//! document attachments, the event calendar and record lifecycle on top
//! of the core repository traits.

pub mod assignment;
pub mod cache;
pub mod category_filter;
pub mod config;
pub mod documents;
pub mod error;
pub mod events;
pub mod feedback;
pub mod records;
pub mod storage;

pub use assignment::{AssignmentOutcome, AssignmentService};
pub use cache::{PageCacheInvalidator, TaggedCache};
pub use category_filter::CategoryFilter;
pub use config::RegistryConfig;
pub use documents::{DocumentChange, DocumentRemoval, DocumentService};
pub use error::ReleaseFailure;
pub use events::EventService;
pub use feedback::{FlashMessage, Severity};
pub use records::RecordService;
pub use storage::LocalFileStorage;
