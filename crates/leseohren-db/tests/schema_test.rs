//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    leseohren_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(
        info_str.contains("organization"),
        "missing organization table"
    );
    assert!(info_str.contains("person"), "missing person table");
    assert!(info_str.contains("category"), "missing category table");
    assert!(info_str.contains("document"), "missing document table");
    assert!(info_str.contains("volunteer"), "missing volunteer edge");
    assert!(info_str.contains("event"), "missing event table");
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    leseohren_db::run_migrations(&db).await.unwrap();
    leseohren_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 2, "expected one record per migration");
}

#[tokio::test]
async fn invalid_document_slot_is_rejected_by_schema() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    leseohren_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE document SET person_id = 'p', slot = 'Passport', \
             file_ref = 'f', file_name = 'scan.pdf'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "unknown slot should violate the ASSERT");
}
