//! src/services/storage_service.rs
//!
//! StorageService — folder-style operations on top of a flat object store.
//! Each operation validates its identifiers, derives one storage key and
//! issues exactly one backend call. No state is kept between requests.

use crate::models::storage_key::{KeyError, StorageKey, is_folder_marker};
use crate::services::backend::{BackendError, BackendResult, ObjectBackend};
use std::{fmt, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Content type every upload URL is signed for.
pub const UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// Default validity of upload and download URLs.
pub const DEFAULT_URL_EXPIRY: Duration = Duration::from_secs(60);

/// The gateway operations, used to label failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    CreateFolder,
    UploadUrl,
    ListFiles,
    DownloadUrl,
    DeleteFile,
}

impl Operation {
    /// Message returned to callers when the backend call fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::CreateFolder => "Folder creation failed",
            Operation::UploadUrl => "Failed to generate URL",
            Operation::ListFiles => "Failed to list files",
            Operation::DownloadUrl => "Failed to generate download URL",
            Operation::DeleteFile => "File deletion failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::CreateFolder => "create-folder",
            Operation::UploadUrl => "get-upload-url",
            Operation::ListFiles => "list-files",
            Operation::DownloadUrl => "get-download-url",
            Operation::DeleteFile => "delete-file",
        })
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    InvalidKey(#[from] KeyError),
    #[error("{op}: {source}")]
    Backend {
        op: Operation,
        #[source]
        source: BackendError,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

trait BackendResultExt<T> {
    fn during(self, op: Operation) -> StorageResult<T>;
}

impl<T> BackendResultExt<T> for BackendResult<T> {
    fn during(self, op: Operation) -> StorageResult<T> {
        self.map_err(|source| StorageError::Backend { op, source })
    }
}

/// Folder and file operations scoped to `userId/folderName/`.
///
/// Cheap to clone: the backend (and the S3 client inside it) is shared.
#[derive(Clone)]
pub struct StorageService {
    backend: Arc<dyn ObjectBackend>,
    url_expiry: Duration,
}

impl StorageService {
    pub fn new(backend: Arc<dyn ObjectBackend>, url_expiry: Duration) -> Self {
        Self {
            backend,
            url_expiry,
        }
    }

    /// Write the empty folder marker. Repeating it simply overwrites the marker.
    #[instrument(skip(self))]
    pub async fn create_folder(&self, user_id: &str, folder_name: &str) -> StorageResult<StorageKey> {
        let key = StorageKey::folder_marker(user_id, folder_name)?;
        self.backend
            .put_empty(key.as_str())
            .await
            .during(Operation::CreateFolder)?;
        info!(%key, "folder marker written");
        Ok(key)
    }

    /// Presigned PUT URL for `userId/folderName/fileName`.
    #[instrument(skip(self))]
    pub async fn upload_url(
        &self,
        user_id: &str,
        folder_name: &str,
        file_name: &str,
    ) -> StorageResult<String> {
        let key = StorageKey::file(user_id, folder_name, file_name)?;
        let url = self
            .backend
            .presign_put(key.as_str(), self.url_expiry, UPLOAD_CONTENT_TYPE)
            .await
            .during(Operation::UploadUrl)?;
        debug!(%key, expiry_secs = self.url_expiry.as_secs(), "issued upload url");
        Ok(url)
    }

    /// Object names under the folder, relative to it, without folder markers.
    #[instrument(skip(self))]
    pub async fn list_files(&self, user_id: &str, folder_name: &str) -> StorageResult<Vec<String>> {
        let prefix = StorageKey::folder_prefix(user_id, folder_name)?;
        let keys = self
            .backend
            .list_keys(prefix.as_str())
            .await
            .during(Operation::ListFiles)?;

        let files: Vec<String> = keys
            .iter()
            .filter(|key| !is_folder_marker(key))
            .filter_map(|key| key.strip_prefix(prefix.as_str()))
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect();
        debug!(%prefix, listed = keys.len(), returned = files.len(), "listed folder");
        Ok(files)
    }

    /// Presigned GET URL for `userId/folderName/fileName`.
    #[instrument(skip(self))]
    pub async fn download_url(
        &self,
        user_id: &str,
        folder_name: &str,
        file_name: &str,
    ) -> StorageResult<String> {
        let key = StorageKey::file(user_id, folder_name, file_name)?;
        let url = self
            .backend
            .presign_get(key.as_str(), self.url_expiry)
            .await
            .during(Operation::DownloadUrl)?;
        debug!(%key, expiry_secs = self.url_expiry.as_secs(), "issued download url");
        Ok(url)
    }

    /// Delete one file. Deleting a key that does not exist succeeds.
    #[instrument(skip(self))]
    pub async fn delete_file(
        &self,
        user_id: &str,
        folder_name: &str,
        file_name: &str,
    ) -> StorageResult<StorageKey> {
        let key = StorageKey::file(user_id, folder_name, file_name)?;
        self.backend
            .delete(key.as_str())
            .await
            .during(Operation::DeleteFile)?;
        info!(%key, "file deleted");
        Ok(key)
    }

    /// Backend reachability, for the readiness probe.
    pub async fn probe(&self) -> BackendResult<()> {
        self.backend.probe().await
    }
}
