//! SurrealDB implementation of [`OrganizationRepository`].
//!
//! Roster membership is stored as `organization -> volunteer -> person`
//! edges. Adding and removing touch exactly one edge, so concurrent
//! changes for different persons never overwrite each other.

use chrono::{DateTime, Utc};
use leseohren_core::error::RegistryResult;
use leseohren_core::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use leseohren_core::models::person::Person;
use leseohren_core::repository::{OrganizationRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::person::PersonRowWithId;
use super::{
    CountRow, category_strings, count_of, parse_optional_uuid, parse_uuid, parse_uuids,
    uuid_strings,
};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    city: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    categories: Vec<String>,
    contact_person_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn try_into_organization(self, id: Uuid) -> Result<Organization, DbError> {
        Ok(Organization {
            id,
            name: self.name,
            city: self.city,
            email: self.email,
            phone: self.phone,
            categories: parse_uuids("category", &self.categories)?,
            contact_person_id: parse_optional_uuid("contact person", self.contact_person_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: String,
    name: String,
    city: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    categories: Vec<String>,
    contact_person_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRowWithId {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        let id = parse_uuid("organization", &self.record_id)?;
        OrganizationRow {
            name: self.name,
            city: self.city,
            email: self.email,
            phone: self.phone,
            categories: self.categories,
            contact_person_id: self.contact_person_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_organization(id)
    }
}

fn into_organizations(rows: Vec<OrganizationRowWithId>) -> Result<Vec<Organization>, DbError> {
    rows.into_iter()
        .map(OrganizationRowWithId::try_into_organization)
        .collect()
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Fails with `NotFound` unless both the organization and the person
    /// exist.
    async fn ensure_pair_exists(&self, organization_id: &str, person_id: &str) -> RegistryResult<()> {
        let mut check = self
            .db
            .query(
                "SELECT count() AS total FROM organization \
                 WHERE id = type::record('organization', $organization_id) GROUP ALL; \
                 SELECT count() AS total FROM person \
                 WHERE id = type::record('person', $person_id) GROUP ALL;",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("person_id", person_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let organization_count: Vec<CountRow> = check.take(0).map_err(DbError::from)?;
        if count_of(&organization_count) == 0 {
            return Err(DbError::NotFound {
                entity: "organization".into(),
                id: organization_id.into(),
            }
            .into());
        }

        let person_count: Vec<CountRow> = check.take(1).map_err(DbError::from)?;
        if count_of(&person_count) == 0 {
            return Err(DbError::NotFound {
                entity: "person".into(),
                id: person_id.into(),
            }
            .into());
        }

        Ok(())
    }

    async fn edge_count(&self, organization_id: &str, person_id: &str) -> RegistryResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM volunteer \
                 WHERE in = type::record('organization', $organization_id) \
                 AND out = type::record('person', $person_id) GROUP ALL",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("person_id", person_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(count_of(&rows))
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> RegistryResult<Organization> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('organization', $id) SET \
                 name = $name, city = $city, email = $email, phone = $phone, \
                 categories = $categories, \
                 contact_person_id = $contact_person_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("city", input.city))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .bind(("categories", category_strings(&input.categories)))
            .bind((
                "contact_person_id",
                input.contact_person_id.map(|p| p.to_string()),
            ))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.try_into_organization(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> RegistryResult<Organization> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('organization', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.try_into_organization(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateOrganization) -> RegistryResult<Organization> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.city.is_some() {
            sets.push("city = $city");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.categories.is_some() {
            sets.push("categories = $categories");
        }
        if input.contact_person_id.is_some() {
            sets.push("contact_person_id = $contact_person_id");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('organization', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(city) = input.city {
            builder = builder.bind(("city", city));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(categories) = input.categories {
            builder = builder.bind(("categories", category_strings(&categories)));
        }
        if let Some(contact) = input.contact_person_id {
            builder = builder.bind(("contact_person_id", contact.map(|p| p.to_string())));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.try_into_organization(id)?)
    }

    async fn delete(&self, id: Uuid) -> RegistryResult<()> {
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE volunteer WHERE in = type::record('organization', $id); \
                 DELETE type::record('organization', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> RegistryResult<PaginatedResult<Organization>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM organization GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_of(&count_rows);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM organization \
                 ORDER BY name ASC, created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(PaginatedResult {
            items: into_organizations(rows)?,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn find_by_any_category(&self, category_ids: &[Uuid]) -> RegistryResult<Vec<Organization>> {
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE categories ANYINSIDE $category_ids \
                 ORDER BY name ASC, created_at ASC",
            )
            .bind(("category_ids", uuid_strings(category_ids)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_organizations(rows)?)
    }

    async fn add_volunteer(&self, organization_id: Uuid, person_id: Uuid) -> RegistryResult<bool> {
        let organization_id_str = organization_id.to_string();
        let person_id_str = person_id.to_string();

        self.ensure_pair_exists(&organization_id_str, &person_id_str)
            .await?;

        if self.edge_count(&organization_id_str, &person_id_str).await? > 0 {
            return Ok(false);
        }

        // The unique (in, out) index rejects a concurrent duplicate.
        let query = format!(
            "RELATE organization:`{organization_id_str}` -> volunteer -> person:`{person_id_str}`;"
        );

        self.db
            .query(query)
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(true)
    }

    async fn remove_volunteer(
        &self,
        organization_id: Uuid,
        person_id: Uuid,
    ) -> RegistryResult<bool> {
        let organization_id_str = organization_id.to_string();
        let person_id_str = person_id.to_string();

        self.ensure_pair_exists(&organization_id_str, &person_id_str)
            .await?;

        let mut result = self
            .db
            .query(
                "DELETE volunteer WHERE \
                 in = type::record('organization', $organization_id) AND \
                 out = type::record('person', $person_id) \
                 RETURN BEFORE",
            )
            .bind(("organization_id", organization_id_str))
            .bind(("person_id", person_id_str))
            .await
            .map_err(DbError::from)?;

        let removed: Vec<surrealdb_types::Value> = result.take(0).map_err(DbError::from)?;
        Ok(!removed.is_empty())
    }

    async fn is_volunteer(&self, organization_id: Uuid, person_id: Uuid) -> RegistryResult<bool> {
        let count = self
            .edge_count(&organization_id.to_string(), &person_id.to_string())
            .await?;
        Ok(count > 0)
    }

    async fn get_volunteers(&self, organization_id: Uuid) -> RegistryResult<Vec<Person>> {
        let organization_id_str = organization_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM organization \
                 WHERE id = type::record('organization', $organization_id) GROUP ALL; \
                 SELECT meta::id(id) AS record_id, * FROM person \
                 WHERE id IN (\
                     SELECT VALUE out FROM volunteer \
                     WHERE in = type::record('organization', $organization_id)\
                 ) \
                 ORDER BY lastname ASC, firstname ASC, created_at ASC;",
            )
            .bind(("organization_id", organization_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let organization_count: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        if count_of(&organization_count) == 0 {
            return Err(DbError::NotFound {
                entity: "organization".into(),
                id: organization_id_str,
            }
            .into());
        }

        let rows: Vec<PersonRowWithId> = result.take(1).map_err(DbError::from)?;
        rows.into_iter()
            .map(PersonRowWithId::try_into_person)
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }

    async fn get_person_organizations(&self, person_id: Uuid) -> RegistryResult<Vec<Organization>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE id IN (\
                     SELECT VALUE in FROM volunteer \
                     WHERE out = type::record('person', $person_id)\
                 ) \
                 ORDER BY name ASC, created_at ASC",
            )
            .bind(("person_id", person_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_organizations(rows)?)
    }
}
