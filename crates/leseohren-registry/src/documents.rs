//! Document attachment management.
//!
//! Payloads live in a [`FileStorage`], metadata in a
//! [`DocumentRepository`]. Releasing a payload is best-effort: a failed
//! release is logged and reported next to the result, but metadata
//! changes are always applied.

use leseohren_core::error::{RegistryError, RegistryResult};
use leseohren_core::models::document::{CreateDocument, Document, DocumentSlot, FileRef, NewFile};
use leseohren_core::models::person::{CertificateCheck, Person};
use leseohren_core::repository::{DocumentRepository, PersonRepository};
use leseohren_core::storage::FileStorage;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ReleaseFailure;

/// A stored or replaced document.
#[derive(Debug, Clone)]
pub struct DocumentChange {
    pub document: Document,
    /// Payloads that were replaced but could not be released.
    pub release_failures: Vec<ReleaseFailure>,
}

/// A removed document.
#[derive(Debug, Clone)]
pub struct DocumentRemoval {
    pub document: Document,
    pub release_failure: Option<ReleaseFailure>,
}

pub struct DocumentService<P: PersonRepository, D: DocumentRepository, S: FileStorage> {
    persons: P,
    documents: D,
    storage: S,
}

impl<P, D, S> DocumentService<P, D, S>
where
    P: PersonRepository,
    D: DocumentRepository,
    S: FileStorage,
{
    pub fn new(persons: P, documents: D, storage: S) -> Self {
        Self {
            persons,
            documents,
            storage,
        }
    }

    /// Put `file` into a single-valued slot, releasing the previous
    /// occupant.
    ///
    /// If the new metadata cannot be written, the freshly stored payload
    /// is released again, the previous occupant is left untouched and the
    /// error is returned.
    pub async fn replace_document(
        &self,
        person_id: Uuid,
        slot: DocumentSlot,
        file: NewFile,
    ) -> RegistryResult<DocumentChange> {
        if !slot.is_single() {
            return Err(RegistryError::validation(format!(
                "slot {slot} holds a collection; use add_other_document"
            )));
        }
        self.persons.get_by_id(person_id).await?;
        let previous = self.documents.get_slot(person_id, slot).await?;

        let size = file.bytes.len() as u64;
        let stored = self.storage.store(&file.file_name, file.bytes).await?;

        let input = CreateDocument {
            person_id,
            slot,
            file: stored.clone(),
            file_name: file.file_name,
            size,
        };
        let document = match self.documents.replace_slot(input).await {
            Ok(document) => document,
            Err(e) => {
                // Best-effort; the write error is what gets reported.
                let _ = self.release(&stored).await;
                return Err(e);
            }
        };

        // The previous occupant stays intact until its metadata is gone.
        let mut release_failures = Vec::new();
        if let Some(previous) = previous {
            if let Err(failure) = self.release(&previous.file).await {
                release_failures.push(failure);
            }
        }

        info!(%person_id, %slot, file = %document.file, "Document replaced");
        Ok(DocumentChange {
            document,
            release_failures,
        })
    }

    /// Append `file` to the person's open-ended document collection.
    pub async fn add_other_document(
        &self,
        person_id: Uuid,
        file: NewFile,
    ) -> RegistryResult<Document> {
        self.persons.get_by_id(person_id).await?;

        let size = file.bytes.len() as u64;
        let stored = self.storage.store(&file.file_name, file.bytes).await?;
        let input = CreateDocument {
            person_id,
            slot: DocumentSlot::Other,
            file: stored.clone(),
            file_name: file.file_name,
            size,
        };
        let document = match self.documents.create(input).await {
            Ok(document) => document,
            Err(e) => {
                let _ = self.release(&stored).await;
                return Err(e);
            }
        };

        info!(%person_id, document_id = %document.id, "Document added");
        Ok(document)
    }

    /// Remove a document from whichever slot holds it.
    ///
    /// Fails with `NotFound` and changes nothing when the person has no
    /// such document.
    pub async fn remove_document(
        &self,
        person_id: Uuid,
        document_id: Uuid,
    ) -> RegistryResult<DocumentRemoval> {
        let document = self.documents.get_by_id(person_id, document_id).await?;
        let release_failure = self.release(&document.file).await.err();
        self.documents.delete(person_id, document_id).await?;

        info!(%person_id, %document_id, slot = %document.slot, "Document removed");
        Ok(DocumentRemoval {
            document,
            release_failure,
        })
    }

    pub async fn documents_of(&self, person_id: Uuid) -> RegistryResult<Vec<Document>> {
        self.documents.list_by_person(person_id).await
    }

    /// Read a document's payload.
    pub async fn read_document(&self, person_id: Uuid, document_id: Uuid) -> RegistryResult<Vec<u8>> {
        let document = self.documents.get_by_id(person_id, document_id).await?;
        self.storage.read(&document.file).await
    }

    /// Record the certificate-of-good-conduct check from form values.
    pub async fn update_certificate_check(
        &self,
        person_id: Uuid,
        check: CertificateCheck,
    ) -> RegistryResult<Person> {
        let update = check.into_update()?;
        let person = self.persons.update(person_id, update).await?;
        info!(
            %person_id,
            checked = person.certificate_checked,
            "Certificate check updated"
        );
        Ok(person)
    }

    /// Release every payload of a person. Metadata is left in place.
    pub async fn release_all(&self, person_id: Uuid) -> RegistryResult<Vec<ReleaseFailure>> {
        let mut failures = Vec::new();
        for document in self.documents.list_by_person(person_id).await? {
            if let Err(failure) = self.release(&document.file).await {
                failures.push(failure);
            }
        }
        Ok(failures)
    }

    async fn release(&self, file: &FileRef) -> Result<(), ReleaseFailure> {
        self.storage.delete(file).await.map_err(|e| {
            warn!(%file, error = %e, "Failed to release stored file");
            ReleaseFailure {
                file: file.clone(),
                reason: e.to_string(),
            }
        })
    }
}
