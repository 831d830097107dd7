//! Integration tests for document attachments with an in-memory storage
//! double whose releases can be made to fail.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};

use leseohren_core::error::{RegistryError, RegistryResult};
use leseohren_core::models::document::{CreateDocument, Document, DocumentSlot, FileRef, NewFile};
use leseohren_core::models::person::{CertificateCheck, CreatePerson};
use leseohren_core::repository::{DocumentRepository, PersonRepository};
use leseohren_core::storage::FileStorage;
use leseohren_db::repository::{SurrealDocumentRepository, SurrealPersonRepository};
use leseohren_registry::DocumentService;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

#[derive(Default)]
struct MemoryStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
    released: Mutex<Vec<FileRef>>,
    fail_release: bool,
    counter: AtomicU64,
}

impl MemoryStorage {
    fn failing_release() -> Self {
        Self {
            fail_release: true,
            ..Default::default()
        }
    }

    fn released(&self) -> Vec<FileRef> {
        self.released.lock().unwrap().clone()
    }

    fn holds(&self, file: &FileRef) -> bool {
        self.files.lock().unwrap().contains_key(file.as_str())
    }
}

impl FileStorage for MemoryStorage {
    async fn store(&self, file_name: &str, bytes: Vec<u8>) -> RegistryResult<FileRef> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let file = FileRef(format!("{n}-{file_name}"));
        self.files.lock().unwrap().insert(file.0.clone(), bytes);
        Ok(file)
    }

    async fn read(&self, file: &FileRef) -> RegistryResult<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(file.as_str())
            .cloned()
            .ok_or_else(|| RegistryError::not_found("file", file))
    }

    async fn delete(&self, file: &FileRef) -> RegistryResult<()> {
        self.released.lock().unwrap().push(file.clone());
        if self.fail_release {
            return Err(RegistryError::Storage("permission denied".into()));
        }
        self.files.lock().unwrap().remove(file.as_str());
        Ok(())
    }
}

/// Delegates to SurrealDB but refuses to write slot metadata.
struct BrokenSlotWrites(SurrealDocumentRepository<Db>);

impl DocumentRepository for BrokenSlotWrites {
    async fn create(&self, input: CreateDocument) -> RegistryResult<Document> {
        self.0.create(input).await
    }

    async fn replace_slot(&self, _input: CreateDocument) -> RegistryResult<Document> {
        Err(RegistryError::Database("write rejected".into()))
    }

    async fn get_by_id(&self, person_id: Uuid, id: Uuid) -> RegistryResult<Document> {
        self.0.get_by_id(person_id, id).await
    }

    async fn get_slot(
        &self,
        person_id: Uuid,
        slot: DocumentSlot,
    ) -> RegistryResult<Option<Document>> {
        self.0.get_slot(person_id, slot).await
    }

    async fn list_by_person(&self, person_id: Uuid) -> RegistryResult<Vec<Document>> {
        self.0.list_by_person(person_id).await
    }

    async fn delete(&self, person_id: Uuid, id: Uuid) -> RegistryResult<()> {
        self.0.delete(person_id, id).await
    }
}

async fn setup() -> (Surreal<Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    leseohren_db::run_migrations(&db).await.unwrap();

    let person = SurrealPersonRepository::new(db.clone())
        .create(CreatePerson {
            firstname: "Jane".into(),
            lastname: "Ames".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    (db, person.id)
}

type Service<D> = DocumentService<SurrealPersonRepository<Db>, D, Arc<MemoryStorage>>;

fn service(db: &Surreal<Db>, storage: Arc<MemoryStorage>) -> Service<SurrealDocumentRepository<Db>> {
    DocumentService::new(
        SurrealPersonRepository::new(db.clone()),
        SurrealDocumentRepository::new(db.clone()),
        storage,
    )
}

fn upload(name: &str) -> NewFile {
    NewFile {
        file_name: name.into(),
        bytes: name.as_bytes().to_vec(),
    }
}

#[tokio::test]
async fn replace_releases_previous_file() {
    let (db, person) = setup().await;
    let storage = Arc::new(MemoryStorage::default());
    let documents = service(&db, storage.clone());

    let first = documents
        .replace_document(person, DocumentSlot::Certificate, upload("fileA.pdf"))
        .await
        .unwrap();
    assert!(first.release_failures.is_empty());

    let second = documents
        .replace_document(person, DocumentSlot::Certificate, upload("fileB.pdf"))
        .await
        .unwrap();
    assert!(second.release_failures.is_empty());
    assert_eq!(second.document.file_name, "fileB.pdf");
    assert_eq!(second.document.size, 9);

    let all = documents.documents_of(person).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].file, second.document.file);
    assert_eq!(storage.released(), vec![first.document.file.clone()]);
    assert!(!storage.holds(&first.document.file));
    assert!(storage.holds(&second.document.file));
}

#[tokio::test]
async fn failed_release_still_replaces_metadata() {
    let (db, person) = setup().await;
    let storage = Arc::new(MemoryStorage::failing_release());
    let documents = service(&db, storage.clone());

    let first = documents
        .replace_document(person, DocumentSlot::Certificate, upload("fileA.pdf"))
        .await
        .unwrap();
    let second = documents
        .replace_document(person, DocumentSlot::Certificate, upload("fileB.pdf"))
        .await
        .unwrap();

    // Release was attempted for fileA and reported as a soft failure.
    assert_eq!(storage.released(), vec![first.document.file.clone()]);
    assert_eq!(second.release_failures.len(), 1);
    assert_eq!(second.release_failures[0].file, first.document.file);

    let slot = documents.documents_of(person).await.unwrap();
    assert_eq!(slot.len(), 1);
    assert_eq!(slot[0].file, second.document.file);
}

#[tokio::test]
async fn slots_are_independent() {
    let (db, person) = setup().await;
    let documents = service(&db, Arc::new(MemoryStorage::default()));

    documents
        .replace_document(person, DocumentSlot::Certificate, upload("cert.pdf"))
        .await
        .unwrap();
    documents
        .replace_document(person, DocumentSlot::Mandate, upload("mandate.pdf"))
        .await
        .unwrap();

    let slots: Vec<DocumentSlot> = documents
        .documents_of(person)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.slot)
        .collect();
    assert_eq!(slots.len(), 2);
    assert!(slots.contains(&DocumentSlot::Certificate));
    assert!(slots.contains(&DocumentSlot::Mandate));
}

#[tokio::test]
async fn other_slot_is_not_replaceable() {
    let (db, person) = setup().await;
    let storage = Arc::new(MemoryStorage::default());
    let documents = service(&db, storage.clone());

    let result = documents
        .replace_document(person, DocumentSlot::Other, upload("misc.pdf"))
        .await;
    assert!(matches!(result, Err(RegistryError::Validation { .. })));
    assert!(storage.files.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_person_is_not_found() {
    let (db, _) = setup().await;
    let storage = Arc::new(MemoryStorage::default());
    let documents = service(&db, storage.clone());

    let result = documents
        .replace_document(Uuid::new_v4(), DocumentSlot::Mandate, upload("mandate.pdf"))
        .await;
    assert!(matches!(result, Err(RegistryError::NotFound { .. })));
    assert!(storage.files.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_metadata_write_releases_new_payload() {
    let (db, person) = setup().await;
    let storage = Arc::new(MemoryStorage::default());
    let previous = service(&db, storage.clone())
        .replace_document(person, DocumentSlot::Certificate, upload("fileA.pdf"))
        .await
        .unwrap()
        .document;

    let documents = DocumentService::new(
        SurrealPersonRepository::new(db.clone()),
        BrokenSlotWrites(SurrealDocumentRepository::new(db.clone())),
        storage.clone(),
    );
    let result = documents
        .replace_document(person, DocumentSlot::Certificate, upload("fileB.pdf"))
        .await;
    assert!(matches!(result, Err(RegistryError::Database(_))));

    // Only the new payload is released; the previous occupant is intact.
    let released = storage.released();
    assert_eq!(released.len(), 1);
    assert_ne!(released[0], previous.file);
    assert!(!storage.holds(&released[0]));
    assert!(storage.holds(&previous.file));

    let slot = documents.documents_of(person).await.unwrap();
    assert_eq!(slot.len(), 1);
    assert_eq!(slot[0].id, previous.id);
}

#[tokio::test]
async fn other_documents_accumulate() {
    let (db, person) = setup().await;
    let documents = service(&db, Arc::new(MemoryStorage::default()));

    let a = documents
        .add_other_document(person, upload("a.pdf"))
        .await
        .unwrap();
    let b = documents
        .add_other_document(person, upload("a.pdf"))
        .await
        .unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(a.slot, DocumentSlot::Other);

    assert_eq!(documents.documents_of(person).await.unwrap().len(), 2);
    assert_eq!(
        documents.read_document(person, b.id).await.unwrap(),
        b"a.pdf".to_vec()
    );
}

#[tokio::test]
async fn remove_document_from_any_slot() {
    let (db, person) = setup().await;
    let storage = Arc::new(MemoryStorage::failing_release());
    let documents = service(&db, storage.clone());

    let mandate = documents
        .replace_document(person, DocumentSlot::Mandate, upload("mandate.pdf"))
        .await
        .unwrap()
        .document;
    let other = documents
        .add_other_document(person, upload("misc.pdf"))
        .await
        .unwrap();

    let removal = documents.remove_document(person, mandate.id).await.unwrap();
    assert_eq!(removal.document.id, mandate.id);
    // Metadata is removed even though the release failed.
    assert!(removal.release_failure.is_some());

    let left = documents.documents_of(person).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, other.id);
}

#[tokio::test]
async fn removing_unknown_document_changes_nothing() {
    let (db, person) = setup().await;
    let storage = Arc::new(MemoryStorage::default());
    let documents = service(&db, storage.clone());
    documents
        .add_other_document(person, upload("misc.pdf"))
        .await
        .unwrap();

    let result = documents.remove_document(person, Uuid::new_v4()).await;
    assert!(matches!(result, Err(RegistryError::NotFound { .. })));
    assert_eq!(documents.documents_of(person).await.unwrap().len(), 1);
    assert!(storage.released().is_empty());
}

#[tokio::test]
async fn document_of_other_person_is_not_found() {
    let (db, person) = setup().await;
    let documents = service(&db, Arc::new(MemoryStorage::default()));
    let doc = documents
        .add_other_document(person, upload("misc.pdf"))
        .await
        .unwrap();

    let result = documents.remove_document(Uuid::new_v4(), doc.id).await;
    assert!(matches!(result, Err(RegistryError::NotFound { .. })));
}

#[tokio::test]
async fn release_all_reports_failures() {
    let (db, person) = setup().await;
    let storage = Arc::new(MemoryStorage::failing_release());
    let documents = service(&db, storage.clone());
    documents
        .replace_document(person, DocumentSlot::Certificate, upload("cert.pdf"))
        .await
        .unwrap();
    documents
        .add_other_document(person, upload("misc.pdf"))
        .await
        .unwrap();

    let failures = documents.release_all(person).await.unwrap();
    assert_eq!(failures.len(), 2);
    assert_eq!(storage.released().len(), 2);
}

#[tokio::test]
async fn certificate_check_from_form_values() {
    let (db, person) = setup().await;
    let documents = service(&db, Arc::new(MemoryStorage::default()));

    let updated = documents
        .update_certificate_check(
            person,
            CertificateCheck {
                checked: Some(true),
                date: Some("15.03.2025".into()),
            },
        )
        .await
        .unwrap();
    assert!(updated.certificate_checked);
    assert_eq!(
        updated.certificate_date,
        chrono::NaiveDate::from_ymd_opt(2025, 3, 15)
    );

    // Unchecked box with a blank date keeps the stored date.
    let updated = documents
        .update_certificate_check(
            person,
            CertificateCheck {
                checked: None,
                date: Some(String::new()),
            },
        )
        .await
        .unwrap();
    assert!(!updated.certificate_checked);
    assert!(updated.certificate_date.is_some());

    let result = documents
        .update_certificate_check(
            person,
            CertificateCheck {
                checked: Some(true),
                date: Some("31.02.2025".into()),
            },
        )
        .await;
    assert!(matches!(result, Err(RegistryError::Validation { .. })));
}
