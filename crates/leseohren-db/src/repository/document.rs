//! SurrealDB implementation of [`DocumentRepository`].
//!
//! Only metadata lives here; payloads belong to the file storage.

use chrono::{DateTime, Utc};
use leseohren_core::error::RegistryResult;
use leseohren_core::models::document::{CreateDocument, Document, DocumentSlot, FileRef};
use leseohren_core::repository::DocumentRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct DocumentRow {
    person_id: String,
    slot: String,
    file_ref: String,
    file_name: String,
    size: u64,
    created_at: DateTime<Utc>,
}

impl DocumentRow {
    fn try_into_document(self, id: Uuid) -> Result<Document, DbError> {
        let slot = self
            .slot
            .parse::<DocumentSlot>()
            .map_err(|e| DbError::Decode(e.to_string()))?;
        Ok(Document {
            id,
            person_id: parse_uuid("person", &self.person_id)?,
            slot,
            file: FileRef(self.file_ref),
            file_name: self.file_name,
            size: self.size,
            created_at: self.created_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct DocumentRowWithId {
    record_id: String,
    person_id: String,
    slot: String,
    file_ref: String,
    file_name: String,
    size: u64,
    created_at: DateTime<Utc>,
}

impl DocumentRowWithId {
    fn try_into_document(self) -> Result<Document, DbError> {
        let id = parse_uuid("document", &self.record_id)?;
        DocumentRow {
            person_id: self.person_id,
            slot: self.slot,
            file_ref: self.file_ref,
            file_name: self.file_name,
            size: self.size,
            created_at: self.created_at,
        }
        .try_into_document(id)
    }
}

fn into_documents(rows: Vec<DocumentRowWithId>) -> Result<Vec<Document>, DbError> {
    rows.into_iter()
        .map(DocumentRowWithId::try_into_document)
        .collect()
}

const CREATE_DOCUMENT: &str = "CREATE type::record('document', $id) SET \
     person_id = $person_id, slot = $slot, file_ref = $file_ref, \
     file_name = $file_name, size = $size";

/// SurrealDB implementation of the Document repository.
#[derive(Clone)]
pub struct SurrealDocumentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDocumentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Runs `prefix` (if any) and the document CREATE in one transaction
    /// and returns the created row.
    async fn insert(&self, prefix: Option<&str>, input: CreateDocument) -> RegistryResult<Document> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let query = match prefix {
            Some(p) => format!("BEGIN TRANSACTION; {p}; {CREATE_DOCUMENT}; COMMIT TRANSACTION;"),
            None => CREATE_DOCUMENT.to_string(),
        };

        let result = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("person_id", input.person_id.to_string()))
            .bind(("slot", input.slot.as_str()))
            .bind(("file_ref", input.file.0))
            .bind(("file_name", input.file_name))
            .bind(("size", input.size))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        // The CREATE is always the last statement with a result.
        let index = result.num_statements().saturating_sub(1);
        let rows: Vec<DocumentRow> = result.take(index).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "document".into(),
            id: id_str,
        })?;

        Ok(row.try_into_document(id)?)
    }
}

impl<C: Connection> DocumentRepository for SurrealDocumentRepository<C> {
    async fn create(&self, input: CreateDocument) -> RegistryResult<Document> {
        self.insert(None, input).await
    }

    async fn replace_slot(&self, input: CreateDocument) -> RegistryResult<Document> {
        self.insert(
            Some("DELETE document WHERE person_id = $person_id AND slot = $slot"),
            input,
        )
        .await
    }

    async fn get_by_id(&self, person_id: Uuid, id: Uuid) -> RegistryResult<Document> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('document', $id) \
                 WHERE person_id = $person_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("person_id", person_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "document".into(),
            id: id_str,
        })?;

        Ok(row.try_into_document(id)?)
    }

    async fn get_slot(&self, person_id: Uuid, slot: DocumentSlot) -> RegistryResult<Option<Document>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM document \
                 WHERE person_id = $person_id AND slot = $slot \
                 ORDER BY created_at DESC LIMIT 1",
            )
            .bind(("person_id", person_id.to_string()))
            .bind(("slot", slot.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_documents(rows)?.into_iter().next())
    }

    async fn list_by_person(&self, person_id: Uuid) -> RegistryResult<Vec<Document>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM document \
                 WHERE person_id = $person_id \
                 ORDER BY created_at ASC",
            )
            .bind(("person_id", person_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_documents(rows)?)
    }

    async fn delete(&self, person_id: Uuid, id: Uuid) -> RegistryResult<()> {
        self.db
            .query(
                "DELETE type::record('document', $id) \
                 WHERE person_id = $person_id",
            )
            .bind(("id", id.to_string()))
            .bind(("person_id", person_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}
