//! SurrealDB implementation of [`EventRepository`].

use chrono::{DateTime, NaiveDate, Utc};
use leseohren_core::error::RegistryResult;
use leseohren_core::models::event::{CreateEvent, Event, UpdateEvent};
use leseohren_core::repository::EventRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

/// Storage format of `date`; sorts lexicographically in date order.
const DATE_FORMAT: &str = "%Y-%m-%d";

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(raw: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| DbError::Decode(format!("invalid event date '{raw}': {e}")))
}

#[derive(Debug, SurrealValue)]
struct EventRow {
    title: String,
    date: String,
    location: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EventRow {
    fn try_into_event(self, id: Uuid) -> Result<Event, DbError> {
        Ok(Event {
            id,
            date: parse_date(&self.date)?,
            title: self.title,
            location: self.location,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct EventRowWithId {
    record_id: String,
    title: String,
    date: String,
    location: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EventRowWithId {
    fn try_into_event(self) -> Result<Event, DbError> {
        let id = parse_uuid("event", &self.record_id)?;
        EventRow {
            title: self.title,
            date: self.date,
            location: self.location,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_event(id)
    }
}

/// SurrealDB implementation of the Event repository.
#[derive(Clone)]
pub struct SurrealEventRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEventRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn list_where(&self, filter: &str, today: NaiveDate) -> RegistryResult<Vec<Event>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM event WHERE {filter}"
            ))
            .bind(("today", format_date(today)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EventRowWithId> = result.take(0).map_err(DbError::from)?;
        let events = rows
            .into_iter()
            .map(EventRowWithId::try_into_event)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }
}

impl<C: Connection> EventRepository for SurrealEventRepository<C> {
    async fn create(&self, input: CreateEvent) -> RegistryResult<Event> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('event', $id) SET \
                 title = $title, date = $date, \
                 location = $location, description = $description",
            )
            .bind(("id", id_str.clone()))
            .bind(("title", input.title))
            .bind(("date", format_date(input.date)))
            .bind(("location", input.location))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            id: id_str,
        })?;

        Ok(row.try_into_event(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> RegistryResult<Event> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('event', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            id: id_str,
        })?;

        Ok(row.try_into_event(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateEvent) -> RegistryResult<Event> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.date.is_some() {
            sets.push("date = $date");
        }
        if input.location.is_some() {
            sets.push("location = $location");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('event', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(date) = input.date {
            builder = builder.bind(("date", format_date(date)));
        }
        if let Some(location) = input.location {
            builder = builder.bind(("location", location));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            id: id_str,
        })?;

        Ok(row.try_into_event(id)?)
    }

    async fn delete(&self, id: Uuid) -> RegistryResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("DELETE type::record('event', $id) RETURN BEFORE")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let removed: Vec<surrealdb_types::Value> = result.take(0).map_err(DbError::from)?;
        if removed.is_empty() {
            return Err(DbError::NotFound {
                entity: "event".into(),
                id: id_str,
            }
            .into());
        }
        Ok(())
    }

    async fn list_upcoming(&self, today: NaiveDate) -> RegistryResult<Vec<Event>> {
        self.list_where("date >= $today ORDER BY date ASC, title ASC", today)
            .await
    }

    async fn list_past(&self, today: NaiveDate) -> RegistryResult<Vec<Event>> {
        self.list_where("date < $today ORDER BY date DESC, title ASC", today)
            .await
    }
}
