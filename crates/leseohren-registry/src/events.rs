//! Event calendar: dated happenings split into upcoming and past listings.

use chrono::NaiveDate;
use leseohren_core::error::RegistryResult;
use leseohren_core::models::event::{CreateEvent, Event, UpdateEvent};
use leseohren_core::repository::EventRepository;
use tracing::info;
use uuid::Uuid;

pub struct EventService<E: EventRepository> {
    events: E,
}

impl<E: EventRepository> EventService<E> {
    pub fn new(events: E) -> Self {
        Self { events }
    }

    pub async fn create_event(&self, input: CreateEvent) -> RegistryResult<Event> {
        input.validate()?;
        let event = self.events.create(input).await?;
        info!(event_id = %event.id, date = %event.date, "Event created");
        Ok(event)
    }

    pub async fn get_event(&self, id: Uuid) -> RegistryResult<Event> {
        self.events.get_by_id(id).await
    }

    pub async fn update_event(&self, id: Uuid, input: UpdateEvent) -> RegistryResult<Event> {
        input.validate()?;
        let event = self.events.update(id, input).await?;
        info!(event_id = %id, "Event updated");
        Ok(event)
    }

    pub async fn delete_event(&self, id: Uuid) -> RegistryResult<()> {
        self.events.delete(id).await?;
        info!(event_id = %id, "Event deleted");
        Ok(())
    }

    /// Events on or after `today`, soonest first.
    pub async fn upcoming(&self, today: NaiveDate) -> RegistryResult<Vec<Event>> {
        self.events.list_upcoming(today).await
    }

    /// Events before `today`, most recent first.
    pub async fn past(&self, today: NaiveDate) -> RegistryResult<Vec<Event>> {
        self.events.list_past(today).await
    }
}
