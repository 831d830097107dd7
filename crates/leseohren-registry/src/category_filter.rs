//! Category-based filtering of persons and organizations.

use std::collections::BTreeSet;

use leseohren_core::error::RegistryResult;
use leseohren_core::models::category::Category;
use leseohren_core::models::organization::Organization;
use leseohren_core::models::person::Person;
use leseohren_core::repository::{CategoryRepository, OrganizationRepository, PersonRepository};
use tracing::warn;
use uuid::Uuid;

use crate::config::RegistryConfig;

/// Read-only filter over the category assignments of persons and
/// organizations.
pub struct CategoryFilter<P: PersonRepository, O: OrganizationRepository, C: CategoryRepository> {
    persons: P,
    organizations: O,
    categories: C,
    config: RegistryConfig,
}

impl<P, O, C> CategoryFilter<P, O, C>
where
    P: PersonRepository,
    O: OrganizationRepository,
    C: CategoryRepository,
{
    pub fn new(persons: P, organizations: O, categories: C, config: RegistryConfig) -> Self {
        Self {
            persons,
            organizations,
            categories,
            config,
        }
    }

    /// Persons carrying at least one of `category_ids`, ordered by
    /// (lastname, firstname). An empty set matches nobody.
    pub async fn find_by_any_category(
        &self,
        category_ids: &BTreeSet<Uuid>,
    ) -> RegistryResult<Vec<Person>> {
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = category_ids.iter().copied().collect();
        self.persons.find_by_any_category(&ids).await
    }

    /// Organizations carrying at least one of `category_ids`, ordered by
    /// name. An empty set matches nothing.
    pub async fn find_organizations_by_any_category(
        &self,
        category_ids: &BTreeSet<Uuid>,
    ) -> RegistryResult<Vec<Organization>> {
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = category_ids.iter().copied().collect();
        self.organizations.find_by_any_category(&ids).await
    }

    /// Direct children of `parent_id`, ordered by name.
    pub async fn categories_under(&self, parent_id: Uuid) -> RegistryResult<Vec<Category>> {
        self.categories.get_children(parent_id).await
    }

    /// Organizations carrying any direct child category of `root_id`.
    pub async fn organizations_in_subtree(
        &self,
        root_id: Uuid,
    ) -> RegistryResult<Vec<Organization>> {
        let children: BTreeSet<Uuid> = self
            .categories_under(root_id)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        self.find_organizations_by_any_category(&children).await
    }

    /// Persons that can be assigned as reading mentors.
    pub async fn volunteer_candidates(&self) -> RegistryResult<Vec<Person>> {
        match self.config.volunteer_category_id {
            Some(id) => self.find_by_any_category(&BTreeSet::from([id])).await,
            None => {
                warn!("volunteer_category_id is not configured");
                Ok(Vec::new())
            }
        }
    }

    /// Persons that can be chosen as an organization's contact person.
    pub async fn contact_persons(&self) -> RegistryResult<Vec<Person>> {
        match self.config.contact_person_category_id {
            Some(id) => self.find_by_any_category(&BTreeSet::from([id])).await,
            None => {
                warn!("contact_person_category_id is not configured");
                Ok(Vec::new())
            }
        }
    }

    /// Categories offered on the person form.
    pub async fn person_categories(&self) -> RegistryResult<Vec<Category>> {
        self.preset_children(self.config.person_category_root_id, "person_category_root_id")
            .await
    }

    /// Categories offered on the organization form.
    pub async fn organization_categories(&self) -> RegistryResult<Vec<Category>> {
        self.preset_children(
            self.config.organization_category_root_id,
            "organization_category_root_id",
        )
        .await
    }

    async fn preset_children(
        &self,
        root: Option<Uuid>,
        setting: &'static str,
    ) -> RegistryResult<Vec<Category>> {
        match root {
            Some(id) => self.categories_under(id).await,
            None => {
                warn!(setting, "category root is not configured");
                Ok(Vec::new())
            }
        }
    }
}
