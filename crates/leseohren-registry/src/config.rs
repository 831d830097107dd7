//! Registry configuration.

use std::path::PathBuf;

use serde::Deserialize;
use uuid::Uuid;

/// Configuration for the registry services.
///
/// Category ids select the presets used to build candidate lists; an
/// unset id yields an empty list.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Category marking persons as reading mentors.
    pub volunteer_category_id: Option<Uuid>,
    /// Category marking persons as contact persons of organizations.
    pub contact_person_category_id: Option<Uuid>,
    /// Parent of the categories offered on the person form.
    pub person_category_root_id: Option<Uuid>,
    /// Parent of the categories offered on the organization form.
    pub organization_category_root_id: Option<Uuid>,
    /// Page showing organization details; its cache is flushed on
    /// roster changes.
    pub organization_show_page_id: Option<u64>,
    /// Root directory for uploaded documents.
    pub storage_root: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            volunteer_category_id: None,
            contact_person_category_id: None,
            person_category_root_id: None,
            organization_category_root_id: None,
            organization_show_page_id: None,
            storage_root: PathBuf::from("var/leseohren/documents"),
        }
    }
}
