//! Soft failures reported alongside successful operations.

use leseohren_core::models::document::FileRef;
use thiserror::Error;

/// A stored payload could not be physically released.
///
/// The metadata change that triggered the release is still applied;
/// this is surfaced as a warning only.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("could not release file {file}: {reason}")]
pub struct ReleaseFailure {
    pub file: FileRef,
    pub reason: String,
}
