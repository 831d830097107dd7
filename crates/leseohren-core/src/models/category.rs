//! Category domain model.
//!
//! Categories are plain classification tags arranged in a tree via
//! `parent_id`. Persons and organizations reference them by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RegistryError, RegistryResult};
use crate::validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub parent_id: Option<Uuid>,
}

impl CreateCategory {
    pub fn validate(&self) -> RegistryResult<()> {
        validate::non_blank("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    /// `Some(Some(id))` = move under `id`, `Some(None)` = make root,
    /// `None` = no change.
    pub parent_id: Option<Option<Uuid>>,
}

impl UpdateCategory {
    /// Validates the update against the category it applies to.
    pub fn validate(&self, id: Uuid) -> RegistryResult<()> {
        if let Some(name) = &self.name {
            validate::non_blank("name", name)?;
        }
        if self.parent_id == Some(Some(id)) {
            return Err(RegistryError::validation(
                "a category cannot be its own parent",
            ));
        }
        Ok(())
    }
}
