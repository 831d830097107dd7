//! File storage collaborator.
//!
//! Payloads are stored and released independently of their metadata.
//! A failed `delete` must never block a metadata change; callers treat
//! it as a soft failure.

use crate::error::RegistryResult;
use crate::models::document::FileRef;

pub trait FileStorage: Send + Sync {
    /// Store a payload and return a reference to it.
    fn store(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = RegistryResult<FileRef>> + Send;

    fn read(&self, file: &FileRef) -> impl Future<Output = RegistryResult<Vec<u8>>> + Send;

    /// Release (physically delete) a payload.
    fn delete(&self, file: &FileRef) -> impl Future<Output = RegistryResult<()>> + Send;
}

impl<T: FileStorage> FileStorage for std::sync::Arc<T> {
    fn store(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = RegistryResult<FileRef>> + Send {
        (**self).store(file_name, bytes)
    }

    fn read(&self, file: &FileRef) -> impl Future<Output = RegistryResult<Vec<u8>>> + Send {
        (**self).read(file)
    }

    fn delete(&self, file: &FileRef) -> impl Future<Output = RegistryResult<()>> + Send {
        (**self).delete(file)
    }
}
