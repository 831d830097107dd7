//! SurrealDB implementation of [`PersonRepository`].

use chrono::{DateTime, NaiveDate, Utc};
use leseohren_core::error::RegistryResult;
use leseohren_core::models::person::{CreatePerson, Person, UpdatePerson};
use leseohren_core::repository::{PaginatedResult, Pagination, PersonRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, category_strings, count_of, parse_uuid, parse_uuids, uuid_strings};
use crate::error::DbError;

/// Storage format of `certificate_date`.
const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_date(raw: Option<String>) -> Result<Option<NaiveDate>, DbError> {
    raw.map(|d| {
        NaiveDate::parse_from_str(&d, DATE_FORMAT)
            .map_err(|e| DbError::Decode(format!("invalid certificate date '{d}': {e}")))
    })
    .transpose()
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct PersonRow {
    firstname: String,
    lastname: String,
    email: Option<String>,
    phone: Option<String>,
    city: Option<String>,
    categories: Vec<String>,
    certificate_checked: bool,
    certificate_date: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PersonRow {
    fn try_into_person(self, id: Uuid) -> Result<Person, DbError> {
        Ok(Person {
            id,
            firstname: self.firstname,
            lastname: self.lastname,
            email: self.email,
            phone: self.phone,
            city: self.city,
            categories: parse_uuids("category", &self.categories)?,
            certificate_checked: self.certificate_checked,
            certificate_date: parse_date(self.certificate_date)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
///
/// Shared with the roster queries of the organization repository.
#[derive(Debug, SurrealValue)]
pub(super) struct PersonRowWithId {
    record_id: String,
    firstname: String,
    lastname: String,
    email: Option<String>,
    phone: Option<String>,
    city: Option<String>,
    categories: Vec<String>,
    certificate_checked: bool,
    certificate_date: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PersonRowWithId {
    pub(super) fn try_into_person(self) -> Result<Person, DbError> {
        let id = parse_uuid("person", &self.record_id)?;
        PersonRow {
            firstname: self.firstname,
            lastname: self.lastname,
            email: self.email,
            phone: self.phone,
            city: self.city,
            categories: self.categories,
            certificate_checked: self.certificate_checked,
            certificate_date: self.certificate_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_person(id)
    }
}

fn into_persons(rows: Vec<PersonRowWithId>) -> Result<Vec<Person>, DbError> {
    rows.into_iter()
        .map(PersonRowWithId::try_into_person)
        .collect()
}

/// SurrealDB implementation of the Person repository.
#[derive(Clone)]
pub struct SurrealPersonRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPersonRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PersonRepository for SurrealPersonRepository<C> {
    async fn create(&self, input: CreatePerson) -> RegistryResult<Person> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('person', $id) SET \
                 firstname = $firstname, lastname = $lastname, \
                 email = $email, phone = $phone, city = $city, \
                 categories = $categories",
            )
            .bind(("id", id_str.clone()))
            .bind(("firstname", input.firstname))
            .bind(("lastname", input.lastname))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .bind(("city", input.city))
            .bind(("categories", category_strings(&input.categories)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PersonRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "person".into(),
            id: id_str,
        })?;

        Ok(row.try_into_person(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> RegistryResult<Person> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('person', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PersonRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "person".into(),
            id: id_str,
        })?;

        Ok(row.try_into_person(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdatePerson) -> RegistryResult<Person> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.firstname.is_some() {
            sets.push("firstname = $firstname");
        }
        if input.lastname.is_some() {
            sets.push("lastname = $lastname");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.city.is_some() {
            sets.push("city = $city");
        }
        if input.categories.is_some() {
            sets.push("categories = $categories");
        }
        if input.certificate_checked.is_some() {
            sets.push("certificate_checked = $certificate_checked");
        }
        if input.certificate_date.is_some() {
            sets.push("certificate_date = $certificate_date");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('person', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(firstname) = input.firstname {
            builder = builder.bind(("firstname", firstname));
        }
        if let Some(lastname) = input.lastname {
            builder = builder.bind(("lastname", lastname));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(city) = input.city {
            builder = builder.bind(("city", city));
        }
        if let Some(categories) = input.categories {
            builder = builder.bind(("categories", category_strings(&categories)));
        }
        if let Some(checked) = input.certificate_checked {
            builder = builder.bind(("certificate_checked", checked));
        }
        if let Some(date) = input.certificate_date {
            builder = builder.bind(("certificate_date", format_date(date)));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PersonRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "person".into(),
            id: id_str,
        })?;

        Ok(row.try_into_person(id)?)
    }

    async fn delete(&self, id: Uuid) -> RegistryResult<()> {
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE volunteer WHERE out = type::record('person', $id); \
                 DELETE document WHERE person_id = $id; \
                 UPDATE organization SET contact_person_id = NONE \
                     WHERE contact_person_id = $id; \
                 DELETE type::record('person', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> RegistryResult<PaginatedResult<Person>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM person GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_of(&count_rows);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM person \
                 ORDER BY lastname ASC, firstname ASC, created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PersonRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(PaginatedResult {
            items: into_persons(rows)?,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn find_by_any_category(&self, category_ids: &[Uuid]) -> RegistryResult<Vec<Person>> {
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM person \
                 WHERE categories ANYINSIDE $category_ids \
                 ORDER BY lastname ASC, firstname ASC, created_at ASC",
            )
            .bind(("category_ids", uuid_strings(category_ids)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PersonRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_persons(rows)?)
    }
}
