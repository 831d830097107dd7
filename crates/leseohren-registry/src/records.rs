//! Record lifecycle: create, update and delete persons, organizations and
//! categories.
//!
//! Deletions clean up what hangs off a record (stored files, roster
//! edges, category references) and notify the roster listener.

use leseohren_core::error::RegistryResult;
use leseohren_core::events::{RosterChanged, RosterListener};
use leseohren_core::models::category::{Category, CreateCategory, UpdateCategory};
use leseohren_core::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use leseohren_core::models::person::{CreatePerson, Person, UpdatePerson};
use leseohren_core::repository::{
    CategoryRepository, DocumentRepository, OrganizationRepository, PaginatedResult, Pagination,
    PersonRepository,
};
use leseohren_core::storage::FileStorage;
use tracing::info;
use uuid::Uuid;

use crate::documents::DocumentService;
use crate::error::ReleaseFailure;

pub struct RecordService<P, O, C, D, S, L>
where
    P: PersonRepository,
    O: OrganizationRepository,
    C: CategoryRepository,
    D: DocumentRepository,
    S: FileStorage,
    L: RosterListener,
{
    persons: P,
    organizations: O,
    categories: C,
    documents: DocumentService<P, D, S>,
    listener: L,
}

impl<P, O, C, D, S, L> RecordService<P, O, C, D, S, L>
where
    P: PersonRepository,
    O: OrganizationRepository,
    C: CategoryRepository,
    D: DocumentRepository,
    S: FileStorage,
    L: RosterListener,
{
    pub fn new(
        persons: P,
        organizations: O,
        categories: C,
        documents: DocumentService<P, D, S>,
        listener: L,
    ) -> Self {
        Self {
            persons,
            organizations,
            categories,
            documents,
            listener,
        }
    }

    // -----------------------------------------------------------------------
    // Persons
    // -----------------------------------------------------------------------

    pub async fn create_person(&self, input: CreatePerson) -> RegistryResult<Person> {
        input.validate()?;
        self.ensure_categories(&input.categories).await?;
        let person = self.persons.create(input).await?;
        info!(person_id = %person.id, "Person created");
        Ok(person)
    }

    pub async fn get_person(&self, id: Uuid) -> RegistryResult<Person> {
        self.persons.get_by_id(id).await
    }

    pub async fn update_person(&self, id: Uuid, input: UpdatePerson) -> RegistryResult<Person> {
        input.validate()?;
        if let Some(categories) = &input.categories {
            self.ensure_categories(categories).await?;
        }
        let person = self.persons.update(id, input).await?;
        info!(person_id = %id, "Person updated");
        Ok(person)
    }

    /// Delete a person with its documents and roster entries.
    ///
    /// Every organization the person read at receives a roster change.
    pub async fn delete_person(&self, id: Uuid) -> RegistryResult<Vec<ReleaseFailure>> {
        self.persons.get_by_id(id).await?;
        let organizations = self.organizations.get_person_organizations(id).await?;
        let release_failures = self.documents.release_all(id).await?;

        self.persons.delete(id).await?;
        info!(
            person_id = %id,
            organizations = organizations.len(),
            "Person deleted"
        );

        for organization in organizations {
            self.listener
                .on_roster_changed(RosterChanged {
                    organization_id: organization.id,
                })
                .await;
        }
        Ok(release_failures)
    }

    pub async fn list_persons(
        &self,
        pagination: Pagination,
    ) -> RegistryResult<PaginatedResult<Person>> {
        self.persons.list(pagination).await
    }

    // -----------------------------------------------------------------------
    // Organizations
    // -----------------------------------------------------------------------

    pub async fn create_organization(
        &self,
        input: CreateOrganization,
    ) -> RegistryResult<Organization> {
        input.validate()?;
        self.ensure_categories(&input.categories).await?;
        if let Some(contact) = input.contact_person_id {
            self.persons.get_by_id(contact).await?;
        }
        let organization = self.organizations.create(input).await?;
        info!(organization_id = %organization.id, "Organization created");
        Ok(organization)
    }

    pub async fn get_organization(&self, id: Uuid) -> RegistryResult<Organization> {
        self.organizations.get_by_id(id).await
    }

    pub async fn update_organization(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> RegistryResult<Organization> {
        input.validate()?;
        if let Some(categories) = &input.categories {
            self.ensure_categories(categories).await?;
        }
        if let Some(Some(contact)) = input.contact_person_id {
            self.persons.get_by_id(contact).await?;
        }
        let organization = self.organizations.update(id, input).await?;
        info!(organization_id = %id, "Organization updated");
        Ok(organization)
    }

    pub async fn delete_organization(&self, id: Uuid) -> RegistryResult<()> {
        self.organizations.get_by_id(id).await?;
        self.organizations.delete(id).await?;
        info!(organization_id = %id, "Organization deleted");

        self.listener
            .on_roster_changed(RosterChanged {
                organization_id: id,
            })
            .await;
        Ok(())
    }

    pub async fn list_organizations(
        &self,
        pagination: Pagination,
    ) -> RegistryResult<PaginatedResult<Organization>> {
        self.organizations.list(pagination).await
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    pub async fn create_category(&self, input: CreateCategory) -> RegistryResult<Category> {
        input.validate()?;
        if let Some(parent) = input.parent_id {
            self.categories.get_by_id(parent).await?;
        }
        let category = self.categories.create(input).await?;
        info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategory,
    ) -> RegistryResult<Category> {
        input.validate(id)?;
        if let Some(Some(parent)) = input.parent_id {
            self.categories.get_by_id(parent).await?;
        }
        let category = self.categories.update(id, input).await?;
        info!(category_id = %id, "Category updated");
        Ok(category)
    }

    pub async fn delete_category(&self, id: Uuid) -> RegistryResult<()> {
        self.categories.get_by_id(id).await?;
        self.categories.delete(id).await?;
        info!(category_id = %id, "Category deleted");
        Ok(())
    }

    pub async fn list_categories(&self) -> RegistryResult<Vec<Category>> {
        self.categories.list().await
    }

    /// Fails with `NotFound` for the first unknown category id.
    async fn ensure_categories(&self, ids: &[Uuid]) -> RegistryResult<()> {
        for id in ids {
            self.categories.get_by_id(*id).await?;
        }
        Ok(())
    }
}
