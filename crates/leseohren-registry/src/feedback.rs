//! User-facing flash messages.

use leseohren_core::error::RegistryError;
use serde::Serialize;

use crate::assignment::AssignmentOutcome;
use crate::error::ReleaseFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Ok,
    Info,
    Warning,
    Error,
}

/// A short notice shown to the user after an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl FlashMessage {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn assignment(outcome: AssignmentOutcome, person: &str, organization: &str) -> Self {
        match outcome {
            AssignmentOutcome::Assigned => Self::new(
                Severity::Ok,
                "Volunteer assigned",
                format!("{person} now reads at {organization}."),
            ),
            AssignmentOutcome::AlreadyAssigned => Self::new(
                Severity::Warning,
                "Already assigned",
                format!("{person} already reads at {organization}."),
            ),
            AssignmentOutcome::Removed => Self::new(
                Severity::Ok,
                "Volunteer removed",
                format!("{person} no longer reads at {organization}."),
            ),
            AssignmentOutcome::NotAssigned => Self::new(
                Severity::Warning,
                "Not assigned",
                format!("{person} does not read at {organization}."),
            ),
        }
    }

    /// Warning for payloads left behind by a document change, if any.
    pub fn release_failures(failures: &[ReleaseFailure]) -> Option<Self> {
        if failures.is_empty() {
            return None;
        }
        let files: Vec<&str> = failures.iter().map(|f| f.file.as_str()).collect();
        Some(Self::new(
            Severity::Warning,
            "File not deleted",
            format!(
                "The document was updated, but these files could not be deleted: {}",
                files.join(", ")
            ),
        ))
    }
}

impl From<&RegistryError> for FlashMessage {
    fn from(err: &RegistryError) -> Self {
        match err {
            RegistryError::NotFound { entity, .. } => {
                Self::new(Severity::Warning, "Not found", format!("The {entity} does not exist."))
            }
            RegistryError::Validation { message } => {
                Self::new(Severity::Warning, "Invalid input", message.clone())
            }
            other => Self::new(Severity::Error, "Something went wrong", other.to_string()),
        }
    }
}
