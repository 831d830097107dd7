//! SurrealDB repository implementations.

mod category;
mod document;
mod event;
mod organization;
mod person;

pub use category::SurrealCategoryRepository;
pub use document::SurrealDocumentRepository;
pub use event::SurrealEventRepository;
pub use organization::SurrealOrganizationRepository;
pub use person::SurrealPersonRepository;

use std::collections::HashSet;

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn count_of(rows: &[CountRow]) -> u64 {
    rows.first().map(|r| r.total).unwrap_or(0)
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

fn parse_optional_uuid(field: &str, raw: Option<String>) -> Result<Option<Uuid>, DbError> {
    raw.map(|r| parse_uuid(field, &r)).transpose()
}

fn parse_uuids(field: &str, raw: &[String]) -> Result<Vec<Uuid>, DbError> {
    raw.iter().map(|r| parse_uuid(field, r)).collect()
}

fn uuid_strings(ids: &[Uuid]) -> Vec<String> {
    ids.iter().map(Uuid::to_string).collect()
}

/// Category ids as stored: distinct, in first-seen order.
fn category_strings(ids: &[Uuid]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(**id))
        .map(Uuid::to_string)
        .collect()
}
