//! Organization domain model.
//!
//! Organizations (kindergartens, schools, libraries, ...) host reading
//! mentors. The volunteer roster is not a field of the model: it lives
//! in a relation and is only changed through the assignment service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RegistryResult;
use crate::validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub id: Uuid,
    /// Display name; default sort key.
    pub name: String,
    pub city: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Category ids classifying the organization (e.g. its type).
    pub categories: Vec<Uuid>,
    /// Contact person at the organization.
    pub contact_person_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new organization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateOrganization {
    pub name: String,
    pub city: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub categories: Vec<Uuid>,
    pub contact_person_id: Option<Uuid>,
}

impl CreateOrganization {
    pub fn validate(&self) -> RegistryResult<()> {
        validate::non_blank("name", &self.name)?;
        validate::email(self.email.as_deref())
    }
}

/// Fields that can be updated on an existing organization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateOrganization {
    pub name: Option<String>,
    /// Contact fields: `Some(None)` clears the stored value.
    pub city: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub categories: Option<Vec<Uuid>>,
    /// `Some(Some(id))` = set, `Some(None)` = clear, `None` = no change.
    pub contact_person_id: Option<Option<Uuid>>,
}

impl UpdateOrganization {
    pub fn validate(&self) -> RegistryResult<()> {
        if let Some(name) = &self.name {
            validate::non_blank("name", name)?;
        }
        validate::email(self.email.as_ref().and_then(Option::as_deref))
    }
}
