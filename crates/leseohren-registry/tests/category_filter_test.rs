//! Integration tests for category filtering and configured presets.

use std::collections::BTreeSet;

use leseohren_core::models::category::CreateCategory;
use leseohren_core::models::organization::CreateOrganization;
use leseohren_core::models::person::CreatePerson;
use leseohren_core::repository::{CategoryRepository, OrganizationRepository, PersonRepository};
use leseohren_db::repository::{
    SurrealCategoryRepository, SurrealOrganizationRepository, SurrealPersonRepository,
};
use leseohren_registry::{CategoryFilter, RegistryConfig};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Filter = CategoryFilter<
    SurrealPersonRepository<Db>,
    SurrealOrganizationRepository<Db>,
    SurrealCategoryRepository<Db>,
>;

struct Fixture {
    db: Surreal<Db>,
    /// "Lesepaten"
    mentors: Uuid,
    /// "Kontaktpersonen"
    contacts: Uuid,
    /// Root of the organization categories.
    org_root: Uuid,
    /// Child of `org_root`: "Schule"
    school: Uuid,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    leseohren_db::run_migrations(&db).await.unwrap();

    let categories = SurrealCategoryRepository::new(db.clone());
    let category = |name: &str, parent_id: Option<Uuid>| CreateCategory {
        name: name.into(),
        parent_id,
    };
    let person_root = categories.create(category("Personen", None)).await.unwrap();
    let mentors = categories
        .create(category("Lesepaten", Some(person_root.id)))
        .await
        .unwrap();
    let contacts = categories
        .create(category("Kontaktpersonen", Some(person_root.id)))
        .await
        .unwrap();
    let org_root = categories.create(category("Einrichtungen", None)).await.unwrap();
    let school = categories
        .create(category("Schule", Some(org_root.id)))
        .await
        .unwrap();
    categories
        .create(category("Kita", Some(org_root.id)))
        .await
        .unwrap();

    Fixture {
        db,
        mentors: mentors.id,
        contacts: contacts.id,
        org_root: org_root.id,
        school: school.id,
    }
}

fn filter(db: &Surreal<Db>, config: RegistryConfig) -> Filter {
    CategoryFilter::new(
        SurrealPersonRepository::new(db.clone()),
        SurrealOrganizationRepository::new(db.clone()),
        SurrealCategoryRepository::new(db.clone()),
        config,
    )
}

async fn person(db: &Surreal<Db>, firstname: &str, lastname: &str, categories: Vec<Uuid>) -> Uuid {
    SurrealPersonRepository::new(db.clone())
        .create(CreatePerson {
            firstname: firstname.into(),
            lastname: lastname.into(),
            categories,
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn members_are_ordered_by_last_then_first_name() {
    let f = setup().await;
    person(&f.db, "John", "Doe", vec![f.mentors]).await;
    person(&f.db, "Jane", "Ames", vec![f.mentors, f.contacts]).await;
    person(&f.db, "Max", "Kurz", vec![f.contacts]).await;

    let filter = filter(&f.db, RegistryConfig::default());
    let found = filter
        .find_by_any_category(&BTreeSet::from([f.mentors]))
        .await
        .unwrap();

    let names: Vec<String> = found.iter().map(|p| p.display_name()).collect();
    assert_eq!(names, vec!["Ames, Jane", "Doe, John"]);
}

#[tokio::test]
async fn any_category_matches_union() {
    let f = setup().await;
    person(&f.db, "John", "Doe", vec![f.mentors]).await;
    person(&f.db, "Max", "Kurz", vec![f.contacts]).await;
    person(&f.db, "Eva", "Zett", vec![]).await;

    let filter = filter(&f.db, RegistryConfig::default());
    let found = filter
        .find_by_any_category(&BTreeSet::from([f.mentors, f.contacts]))
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn empty_category_set_matches_nobody() {
    let f = setup().await;
    person(&f.db, "John", "Doe", vec![f.mentors]).await;

    let filter = filter(&f.db, RegistryConfig::default());
    assert!(filter.find_by_any_category(&BTreeSet::new()).await.unwrap().is_empty());
    assert!(
        filter
            .find_organizations_by_any_category(&BTreeSet::new())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn organizations_in_subtree_use_child_categories() {
    let f = setup().await;
    let organizations = SurrealOrganizationRepository::new(f.db.clone());
    organizations
        .create(CreateOrganization {
            name: "Grundschule Nord".into(),
            categories: vec![f.school],
            ..Default::default()
        })
        .await
        .unwrap();
    organizations
        .create(CreateOrganization {
            name: "Sportverein".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let filter = filter(&f.db, RegistryConfig::default());

    let children: Vec<String> = filter
        .categories_under(f.org_root)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(children, vec!["Kita", "Schule"]);

    let in_subtree = filter.organizations_in_subtree(f.org_root).await.unwrap();
    assert_eq!(in_subtree.len(), 1);
    assert_eq!(in_subtree[0].name, "Grundschule Nord");
}

#[tokio::test]
async fn configured_presets() {
    let f = setup().await;
    let doe = person(&f.db, "John", "Doe", vec![f.mentors]).await;
    let kurz = person(&f.db, "Max", "Kurz", vec![f.contacts]).await;

    let filter = filter(
        &f.db,
        RegistryConfig {
            volunteer_category_id: Some(f.mentors),
            contact_person_category_id: Some(f.contacts),
            organization_category_root_id: Some(f.org_root),
            ..Default::default()
        },
    );

    let candidates = filter.volunteer_candidates().await.unwrap();
    assert_eq!(candidates.iter().map(|p| p.id).collect::<Vec<_>>(), vec![doe]);

    let contacts = filter.contact_persons().await.unwrap();
    assert_eq!(contacts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![kurz]);

    assert_eq!(filter.organization_categories().await.unwrap().len(), 2);
    // Not configured.
    assert!(filter.person_categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn unconfigured_presets_are_empty() {
    let f = setup().await;
    person(&f.db, "John", "Doe", vec![f.mentors]).await;

    let filter = filter(&f.db, RegistryConfig::default());
    assert!(filter.volunteer_candidates().await.unwrap().is_empty());
    assert!(filter.contact_persons().await.unwrap().is_empty());
    assert!(filter.organization_categories().await.unwrap().is_empty());
}
