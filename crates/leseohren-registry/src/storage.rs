//! Local filesystem storage for uploaded documents.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use leseohren_core::error::{RegistryError, RegistryResult};
use leseohren_core::models::document::FileRef;
use leseohren_core::storage::FileStorage;
use tracing::debug;
use uuid::Uuid;

/// Stores payloads as flat files under a root directory.
///
/// References have the form `<uuid>-<sanitized upload name>`, so two
/// uploads with the same name never collide.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, file: &FileRef) -> RegistryResult<PathBuf> {
        let name = file.as_str();
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(RegistryError::validation(format!(
                "invalid file reference: {name}"
            )));
        }
        Ok(self.root.join(name))
    }
}

/// Replace everything outside `[A-Za-z0-9._-]` with `_`.
fn sanitize(file_name: &str) -> String {
    let cleaned: String = file_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

fn storage_error(action: &str, path: &Path, err: std::io::Error) -> RegistryError {
    RegistryError::Storage(format!("{action} {}: {err}", path.display()))
}

impl FileStorage for LocalFileStorage {
    async fn store(&self, file_name: &str, bytes: Vec<u8>) -> RegistryResult<FileRef> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| storage_error("create", &self.root, e))?;

        let file = FileRef(format!("{}-{}", Uuid::new_v4(), sanitize(file_name)));
        let path = self.path_of(&file)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| storage_error("write", &path, e))?;

        debug!(%file, "Stored file");
        Ok(file)
    }

    async fn read(&self, file: &FileRef) -> RegistryResult<Vec<u8>> {
        let path = self.path_of(file)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(RegistryError::not_found("file", file))
            }
            Err(e) => Err(storage_error("read", &path, e)),
        }
    }

    async fn delete(&self, file: &FileRef) -> RegistryResult<()> {
        let path = self.path_of(file)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(%file, "Released file");
                Ok(())
            }
            // Already gone.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("delete", &path, e)),
        }
    }
}
