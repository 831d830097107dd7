//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs and dates are stored
//! as strings; the document slot is a string with an ASSERT constraint.
//! Roster membership is the `volunteer` relation with a unique
//! (`in`, `out`) index, so a person appears at most once per roster.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "events",
        sql: SCHEMA_V2,
    },
];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Categories (classification tree)
-- =======================================================================
DEFINE TABLE category SCHEMAFULL;
DEFINE FIELD name ON TABLE category TYPE string;
DEFINE FIELD parent_id ON TABLE category TYPE option<string>;
DEFINE FIELD created_at ON TABLE category TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE category TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_category_parent ON TABLE category COLUMNS parent_id;

-- =======================================================================
-- Organizations
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD city ON TABLE organization TYPE option<string>;
DEFINE FIELD email ON TABLE organization TYPE option<string>;
DEFINE FIELD phone ON TABLE organization TYPE option<string>;
DEFINE FIELD categories ON TABLE organization TYPE array DEFAULT [];
DEFINE FIELD categories.* ON TABLE organization TYPE string;
DEFINE FIELD contact_person_id ON TABLE organization \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_name ON TABLE organization COLUMNS name;

-- =======================================================================
-- Persons (volunteers and contact persons)
-- =======================================================================
DEFINE TABLE person SCHEMAFULL;
DEFINE FIELD firstname ON TABLE person TYPE string DEFAULT '';
DEFINE FIELD lastname ON TABLE person TYPE string DEFAULT '';
DEFINE FIELD email ON TABLE person TYPE option<string>;
DEFINE FIELD phone ON TABLE person TYPE option<string>;
DEFINE FIELD city ON TABLE person TYPE option<string>;
DEFINE FIELD categories ON TABLE person TYPE array DEFAULT [];
DEFINE FIELD categories.* ON TABLE person TYPE string;
DEFINE FIELD certificate_checked ON TABLE person TYPE bool \
    DEFAULT false;
DEFINE FIELD certificate_date ON TABLE person TYPE option<string>;
DEFINE FIELD created_at ON TABLE person TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE person TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_person_name ON TABLE person \
    COLUMNS lastname, firstname;

-- =======================================================================
-- Documents (person attachments)
-- =======================================================================
DEFINE TABLE document SCHEMAFULL;
DEFINE FIELD person_id ON TABLE document TYPE string;
DEFINE FIELD slot ON TABLE document TYPE string \
    ASSERT $value IN ['Certificate', 'Mandate', 'Other'];
DEFINE FIELD file_ref ON TABLE document TYPE string;
DEFINE FIELD file_name ON TABLE document TYPE string;
DEFINE FIELD size ON TABLE document TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE document TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_document_person_slot ON TABLE document \
    COLUMNS person_id, slot;

-- =======================================================================
-- Graph Edge Tables (relations)
-- =======================================================================

-- Organization -> Person volunteer roster
DEFINE TABLE volunteer TYPE RELATION SCHEMAFULL;
DEFINE FIELD created_at ON TABLE volunteer TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_volunteer_pair ON TABLE volunteer \
    COLUMNS in, out UNIQUE;
";

// -----------------------------------------------------------------------
// Schema v2: events
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
DEFINE TABLE event SCHEMAFULL;
DEFINE FIELD title ON TABLE event TYPE string;
DEFINE FIELD date ON TABLE event TYPE string;
DEFINE FIELD location ON TABLE event TYPE option<string>;
DEFINE FIELD description ON TABLE event TYPE option<string>;
DEFINE FIELD created_at ON TABLE event TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE event TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_event_date ON TABLE event COLUMNS date;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Bring the schema of `db` up to the latest version.
///
/// Applied versions are recorded in `_migration`; only newer ones run.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let applied = applied_version(db).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > applied).collect();
    if pending.is_empty() {
        info!(version = applied, "Schema is up to date");
        return Ok(());
    }

    for migration in pending {
        apply(db, migration).await?;
    }
    Ok(())
}

async fn applied_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT version, name FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map_or(0, |m| m.version))
}

async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    let failed = |step: &str, e: String| {
        DbError::Migration(format!(
            "v{} '{}' {step}: {e}",
            migration.version, migration.name
        ))
    };

    info!(version = migration.version, name = migration.name, "Applying migration");
    db.query(migration.sql)
        .await?
        .check()
        .map_err(|e| failed("failed", e.to_string()))?;
    db.query("CREATE _migration SET version = $version, name = $name")
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| failed("could not be recorded", e.to_string()))?;
    info!(version = migration.version, "Migration applied");
    Ok(())
}
