//! Document attachments of a person.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RegistryError;

/// Attachment point on a person.
///
/// `Certificate` and `Mandate` are single-valued slots; `Other` is an
/// open-ended collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentSlot {
    /// Certificate of good conduct.
    Certificate,
    /// Signed mandate.
    Mandate,
    Other,
}

impl DocumentSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Certificate => "Certificate",
            Self::Mandate => "Mandate",
            Self::Other => "Other",
        }
    }

    pub fn is_single(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

impl fmt::Display for DocumentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentSlot {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Certificate" => Ok(Self::Certificate),
            "Mandate" => Ok(Self::Mandate),
            "Other" => Ok(Self::Other),
            other => Err(RegistryError::validation(format!(
                "unknown document slot: {other}"
            ))),
        }
    }
}

/// Opaque reference to a payload held by a [`FileStorage`](crate::storage::FileStorage).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FileRef(pub String);

impl FileRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata of a stored attachment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub person_id: Uuid,
    pub slot: DocumentSlot,
    pub file: FileRef,
    /// Original upload name.
    pub file_name: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// Metadata for a payload that has already been stored.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub person_id: Uuid,
    pub slot: DocumentSlot,
    pub file: FileRef,
    pub file_name: String,
    pub size: u64,
}

/// An uploaded file that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
