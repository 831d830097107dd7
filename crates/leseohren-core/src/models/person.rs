//! Person domain model.
//!
//! A person is a volunteer (reading mentor), a contact person at an
//! organization, or both, depending on the categories assigned.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RegistryError, RegistryResult};
use crate::validate;

/// Date format used by the registry forms (`31.12.2024`).
pub const FORM_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub categories: Vec<Uuid>,
    /// Whether the certificate of good conduct has been checked.
    pub certificate_checked: bool,
    /// Date the certificate of good conduct was verified.
    pub certificate_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// `"lastname, firstname"`, or whichever part is non-empty.
    pub fn display_name(&self) -> String {
        let first = self.firstname.trim();
        let last = self.lastname.trim();
        match (last.is_empty(), first.is_empty()) {
            (false, false) => format!("{last}, {first}"),
            (false, true) => last.to_string(),
            (true, false) => first.to_string(),
            (true, true) => String::new(),
        }
    }

    /// True when neither first nor last name carries a value.
    pub fn is_unlabeled(&self) -> bool {
        self.firstname.trim().is_empty() && self.lastname.trim().is_empty()
    }

    pub fn has_category(&self, category_id: Uuid) -> bool {
        self.categories.contains(&category_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreatePerson {
    pub firstname: String,
    pub lastname: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub categories: Vec<Uuid>,
}

impl CreatePerson {
    pub fn validate(&self) -> RegistryResult<()> {
        validate::email(self.email.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePerson {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    /// Contact fields: `Some(None)` clears the stored value.
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub categories: Option<Vec<Uuid>>,
    pub certificate_checked: Option<bool>,
    /// `Some(Some(date))` = set, `Some(None)` = clear, `None` = no change.
    pub certificate_date: Option<Option<NaiveDate>>,
}

impl UpdatePerson {
    pub fn validate(&self) -> RegistryResult<()> {
        validate::email(self.email.as_ref().and_then(Option::as_deref))
    }
}

/// Form submission for the certificate-of-good-conduct check.
///
/// An absent checkbox means "not checked". The date is only applied when
/// it is non-blank.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CertificateCheck {
    pub checked: Option<bool>,
    pub date: Option<String>,
}

impl CertificateCheck {
    /// Converts the form values into a person update.
    pub fn into_update(self) -> RegistryResult<UpdatePerson> {
        let certificate_date = match self.date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                let date = NaiveDate::parse_from_str(raw, FORM_DATE_FORMAT).map_err(|e| {
                    RegistryError::validation(format!("invalid certificate date '{raw}': {e}"))
                })?;
                Some(Some(date))
            }
            _ => None,
        };
        Ok(UpdatePerson {
            certificate_checked: Some(self.checked.unwrap_or(false)),
            certificate_date,
            ..Default::default()
        })
    }
}
