//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Roster membership is exposed as
//! targeted single-edge operations only; there is no way to replace an
//! organization's whole volunteer set.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::RegistryResult;
use crate::models::{
    category::{Category, CreateCategory, UpdateCategory},
    document::{CreateDocument, Document, DocumentSlot},
    event::{CreateEvent, Event, UpdateEvent},
    organization::{CreateOrganization, Organization, UpdateOrganization},
    person::{CreatePerson, Person, UpdatePerson},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Organizations and rosters
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = RegistryResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RegistryResult<Organization>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> impl Future<Output = RegistryResult<Organization>> + Send;
    /// Deletes the organization together with its roster edges.
    fn delete(&self, id: Uuid) -> impl Future<Output = RegistryResult<()>> + Send;
    /// Lists organizations ordered by name.
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = RegistryResult<PaginatedResult<Organization>>> + Send;

    /// Organizations having at least one of the given categories,
    /// ordered by name.
    fn find_by_any_category(
        &self,
        category_ids: &[Uuid],
    ) -> impl Future<Output = RegistryResult<Vec<Organization>>> + Send;

    /// Add a person to the roster (creates a single `volunteer` edge).
    ///
    /// Returns `false` without mutating when the edge already exists.
    /// Fails with `NotFound` when either record is unknown.
    fn add_volunteer(
        &self,
        organization_id: Uuid,
        person_id: Uuid,
    ) -> impl Future<Output = RegistryResult<bool>> + Send;

    /// Remove a person from the roster (deletes a single edge).
    ///
    /// Returns `false` when there was nothing to remove.
    fn remove_volunteer(
        &self,
        organization_id: Uuid,
        person_id: Uuid,
    ) -> impl Future<Output = RegistryResult<bool>> + Send;

    fn is_volunteer(
        &self,
        organization_id: Uuid,
        person_id: Uuid,
    ) -> impl Future<Output = RegistryResult<bool>> + Send;

    /// Roster of an organization ordered by (lastname, firstname).
    fn get_volunteers(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = RegistryResult<Vec<Person>>> + Send;

    /// Organizations a person volunteers for, ordered by name.
    fn get_person_organizations(
        &self,
        person_id: Uuid,
    ) -> impl Future<Output = RegistryResult<Vec<Organization>>> + Send;
}

// ---------------------------------------------------------------------------
// Persons
// ---------------------------------------------------------------------------

pub trait PersonRepository: Send + Sync {
    fn create(&self, input: CreatePerson) -> impl Future<Output = RegistryResult<Person>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RegistryResult<Person>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePerson,
    ) -> impl Future<Output = RegistryResult<Person>> + Send;
    /// Deletes the person, its roster edges and its document metadata.
    /// Stored payloads are not touched.
    fn delete(&self, id: Uuid) -> impl Future<Output = RegistryResult<()>> + Send;
    /// Lists persons ordered by (lastname, firstname).
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = RegistryResult<PaginatedResult<Person>>> + Send;

    /// Persons having at least one of the given categories, ordered by
    /// (lastname, firstname, created_at).
    fn find_by_any_category(
        &self,
        category_ids: &[Uuid],
    ) -> impl Future<Output = RegistryResult<Vec<Person>>> + Send;
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

pub trait CategoryRepository: Send + Sync {
    fn create(
        &self,
        input: CreateCategory,
    ) -> impl Future<Output = RegistryResult<Category>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RegistryResult<Category>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateCategory,
    ) -> impl Future<Output = RegistryResult<Category>> + Send;
    /// Deletes the category, detaches its children and strips the id from
    /// every person and organization.
    fn delete(&self, id: Uuid) -> impl Future<Output = RegistryResult<()>> + Send;
    /// All categories ordered by name.
    fn list(&self) -> impl Future<Output = RegistryResult<Vec<Category>>> + Send;

    /// Direct children of a category, ordered by name.
    fn get_children(
        &self,
        parent_id: Uuid,
    ) -> impl Future<Output = RegistryResult<Vec<Category>>> + Send;
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

pub trait DocumentRepository: Send + Sync {
    /// Append a document to a person.
    fn create(&self, input: CreateDocument)
    -> impl Future<Output = RegistryResult<Document>> + Send;

    /// Drop whatever occupies `input.slot` and store `input` in its place.
    fn replace_slot(
        &self,
        input: CreateDocument,
    ) -> impl Future<Output = RegistryResult<Document>> + Send;

    fn get_by_id(
        &self,
        person_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = RegistryResult<Document>> + Send;

    /// Current occupant of a single-valued slot.
    fn get_slot(
        &self,
        person_id: Uuid,
        slot: DocumentSlot,
    ) -> impl Future<Output = RegistryResult<Option<Document>>> + Send;

    /// All documents of a person ordered by creation time.
    fn list_by_person(
        &self,
        person_id: Uuid,
    ) -> impl Future<Output = RegistryResult<Vec<Document>>> + Send;

    fn delete(&self, person_id: Uuid, id: Uuid)
    -> impl Future<Output = RegistryResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

pub trait EventRepository: Send + Sync {
    fn create(&self, input: CreateEvent) -> impl Future<Output = RegistryResult<Event>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RegistryResult<Event>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateEvent,
    ) -> impl Future<Output = RegistryResult<Event>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = RegistryResult<()>> + Send;

    /// Events on or after `today`, soonest first.
    fn list_upcoming(
        &self,
        today: NaiveDate,
    ) -> impl Future<Output = RegistryResult<Vec<Event>>> + Send;
    /// Events before `today`, most recent first.
    fn list_past(&self, today: NaiveDate)
    -> impl Future<Output = RegistryResult<Vec<Event>>> + Send;
}
