//! Event domain model.
//!
//! Events are dated happenings of the association (reading days, trainings,
//! the yearly Easter reading). Listings split them at "today" into upcoming
//! and past.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RegistryResult;
use crate::validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub location: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// An event on `today` still counts as upcoming.
    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.date < today
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    pub date: NaiveDate,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl CreateEvent {
    pub fn validate(&self) -> RegistryResult<()> {
        validate::non_blank("title", &self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    /// `Some(None)` clears the stored value.
    pub location: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

impl UpdateEvent {
    pub fn validate(&self) -> RegistryResult<()> {
        if let Some(title) = &self.title {
            validate::non_blank("title", title)?;
        }
        Ok(())
    }
}
