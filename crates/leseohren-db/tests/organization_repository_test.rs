//! Integration tests for the Organization repository and volunteer
//! roster edges using in-memory SurrealDB.

use leseohren_core::error::RegistryError;
use leseohren_core::models::organization::{CreateOrganization, UpdateOrganization};
use leseohren_core::models::person::CreatePerson;
use leseohren_core::repository::{OrganizationRepository, Pagination, PersonRepository};
use leseohren_db::repository::{SurrealOrganizationRepository, SurrealPersonRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create two persons.
async fn setup() -> (
    Surreal<Db>,
    Uuid, // person_a_id (Ames)
    Uuid, // person_b_id (Doe)
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    leseohren_db::run_migrations(&db).await.unwrap();

    let person_repo = SurrealPersonRepository::new(db.clone());
    let a = person_repo
        .create(CreatePerson {
            firstname: "Jane".into(),
            lastname: "Ames".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let b = person_repo
        .create(CreatePerson {
            firstname: "John".into(),
            lastname: "Doe".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    (db, a.id, b.id)
}

fn organization(name: &str) -> CreateOrganization {
    CreateOrganization {
        name: name.into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_and_get_organization() {
    let (db, contact, _) = setup().await;
    let repo = SurrealOrganizationRepository::new(db);
    let category = Uuid::new_v4();

    let org = repo
        .create(CreateOrganization {
            name: "Kita Regenbogen".into(),
            city: Some("Bremen".into()),
            email: Some("kita@example.org".into()),
            categories: vec![category],
            contact_person_id: Some(contact),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(org.name, "Kita Regenbogen");
    assert_eq!(org.categories, vec![category]);

    let fetched = repo.get_by_id(org.id).await.unwrap();
    assert_eq!(fetched.id, org.id);
    assert_eq!(fetched.city.as_deref(), Some("Bremen"));
    assert_eq!(fetched.contact_person_id, Some(contact));
}

#[tokio::test]
async fn get_unknown_organization_is_not_found() {
    let (db, _, _) = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    let result = repo.get_by_id(Uuid::new_v4()).await;
    assert!(matches!(result, Err(RegistryError::NotFound { .. })));
}

#[tokio::test]
async fn update_organization_clears_contact_person() {
    let (db, contact, _) = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    let org = repo
        .create(CreateOrganization {
            name: "Grundschule Am Park".into(),
            contact_person_id: Some(contact),
            ..Default::default()
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            org.id,
            UpdateOrganization {
                name: Some("Grundschule Am Stadtpark".into()),
                contact_person_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Grundschule Am Stadtpark");
    assert_eq!(updated.contact_person_id, None);
}

#[tokio::test]
async fn list_is_ordered_by_name() {
    let (db, _, _) = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    for name in ["Stadtbibliothek", "Kita Regenbogen", "Grundschule Nord"] {
        repo.create(organization(name)).await.unwrap();
    }

    let page = repo
        .list(Pagination {
            offset: 0,
            limit: 2,
        })
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    let names: Vec<&str> = page.items.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Grundschule Nord", "Kita Regenbogen"]);
}

#[tokio::test]
async fn find_by_any_category_matches_intersection() {
    let (db, _, _) = setup().await;
    let repo = SurrealOrganizationRepository::new(db);
    let school = Uuid::new_v4();
    let kita = Uuid::new_v4();

    repo.create(CreateOrganization {
        name: "Schule B".into(),
        categories: vec![school],
        ..Default::default()
    })
    .await
    .unwrap();
    repo.create(CreateOrganization {
        name: "Kita A".into(),
        categories: vec![kita],
        ..Default::default()
    })
    .await
    .unwrap();
    repo.create(organization("Bibliothek")).await.unwrap();

    let found = repo.find_by_any_category(&[school, kita]).await.unwrap();
    let names: Vec<&str> = found.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Kita A", "Schule B"]);

    assert!(repo.find_by_any_category(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_volunteer_is_unique_per_pair() {
    let (db, person_a, _) = setup().await;
    let repo = SurrealOrganizationRepository::new(db);
    let org = repo.create(organization("Kita")).await.unwrap();

    assert!(repo.add_volunteer(org.id, person_a).await.unwrap());
    assert!(!repo.add_volunteer(org.id, person_a).await.unwrap());

    let roster = repo.get_volunteers(org.id).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert!(repo.is_volunteer(org.id, person_a).await.unwrap());
}

#[tokio::test]
async fn duplicate_edge_is_rejected_by_index() {
    let (db, person_a, _) = setup().await;
    let repo = SurrealOrganizationRepository::new(db.clone());
    let org = repo.create(organization("Kita")).await.unwrap();

    repo.add_volunteer(org.id, person_a).await.unwrap();

    let result = db
        .query(format!(
            "RELATE organization:`{}` -> volunteer -> person:`{person_a}`;",
            org.id
        ))
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "second edge for the same pair must fail");
}

#[tokio::test]
async fn add_volunteer_unknown_ids_are_not_found() {
    let (db, person_a, _) = setup().await;
    let repo = SurrealOrganizationRepository::new(db);
    let org = repo.create(organization("Kita")).await.unwrap();

    let unknown_org = repo.add_volunteer(Uuid::new_v4(), person_a).await;
    assert!(matches!(
        unknown_org,
        Err(RegistryError::NotFound { ref entity, .. }) if entity == "organization"
    ));

    let unknown_person = repo.add_volunteer(org.id, Uuid::new_v4()).await;
    assert!(matches!(
        unknown_person,
        Err(RegistryError::NotFound { ref entity, .. }) if entity == "person"
    ));
}

#[tokio::test]
async fn remove_volunteer_reports_whether_edge_existed() {
    let (db, person_a, person_b) = setup().await;
    let repo = SurrealOrganizationRepository::new(db);
    let org = repo.create(organization("Kita")).await.unwrap();

    repo.add_volunteer(org.id, person_a).await.unwrap();
    repo.add_volunteer(org.id, person_b).await.unwrap();

    assert!(repo.remove_volunteer(org.id, person_a).await.unwrap());
    assert!(!repo.remove_volunteer(org.id, person_a).await.unwrap());

    let roster = repo.get_volunteers(org.id).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].id, person_b);
}

#[tokio::test]
async fn roster_is_ordered_by_lastname_then_firstname() {
    let (db, ames, doe) = setup().await;
    let repo = SurrealOrganizationRepository::new(db);
    let org = repo.create(organization("Kita")).await.unwrap();

    repo.add_volunteer(org.id, doe).await.unwrap();
    repo.add_volunteer(org.id, ames).await.unwrap();

    let roster = repo.get_volunteers(org.id).await.unwrap();
    let ids: Vec<Uuid> = roster.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![ames, doe]);
}

#[tokio::test]
async fn person_organizations_follow_edges() {
    let (db, person_a, _) = setup().await;
    let repo = SurrealOrganizationRepository::new(db);
    let zoo = repo.create(organization("Zoo-Schule")).await.unwrap();
    let kita = repo.create(organization("Kita")).await.unwrap();
    repo.create(organization("Unbeteiligt")).await.unwrap();

    repo.add_volunteer(zoo.id, person_a).await.unwrap();
    repo.add_volunteer(kita.id, person_a).await.unwrap();

    let orgs = repo.get_person_organizations(person_a).await.unwrap();
    let names: Vec<&str> = orgs.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Kita", "Zoo-Schule"]);
}

#[tokio::test]
async fn delete_organization_removes_roster_edges() {
    let (db, person_a, _) = setup().await;
    let repo = SurrealOrganizationRepository::new(db.clone());
    let org = repo.create(organization("Kita")).await.unwrap();
    repo.add_volunteer(org.id, person_a).await.unwrap();

    repo.delete(org.id).await.unwrap();

    assert!(repo.get_by_id(org.id).await.is_err());
    let mut result = db.query("SELECT * FROM volunteer").await.unwrap();
    let edges: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert!(edges.is_empty(), "roster edges should be gone");
}

#[tokio::test]
async fn organization_categories_are_stored_as_a_set() {
    let (db, _, _) = setup().await;
    let repo = SurrealOrganizationRepository::new(db);
    let school = Uuid::new_v4();

    let org = repo
        .create(CreateOrganization {
            name: "Grundschule Nord".into(),
            categories: vec![school, school],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(org.categories, vec![school]);
}

#[tokio::test]
async fn update_can_clear_phone() {
    let (db, _, _) = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    let org = repo
        .create(CreateOrganization {
            name: "Kita".into(),
            phone: Some("0421 123".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let org = repo
        .update(
            org.id,
            UpdateOrganization {
                phone: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(org.phone, None);
}
