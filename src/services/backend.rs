//! src/services/backend.rs
//!
//! The object-storage primitives the gateway relies on, and their
//! implementation over an S3-compatible API. One `S3Backend` is built at
//! startup and shared by every request.

use crate::config::S3Config;
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region, RequestChecksumCalculation},
    error::DisplayErrorContext,
    presigning::PresigningConfig,
    primitives::ByteStream,
};
use secrecy::ExposeSecret;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("put_object `{key}` failed: {message}")]
    Put { key: String, message: String },
    #[error("list_objects_v2 `{prefix}` failed: {message}")]
    List { prefix: String, message: String },
    #[error("delete_object `{key}` failed: {message}")]
    Delete { key: String, message: String },
    #[error("presigning `{key}` failed: {message}")]
    Presign { key: String, message: String },
    #[error("bucket `{bucket}` unreachable: {message}")]
    Probe { bucket: String, message: String },
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Storage primitives the gateway delegates to. Keys are full object keys
/// inside the configured bucket.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Write a zero-byte object, overwriting any existing one.
    async fn put_empty(&self, key: &str) -> BackendResult<()>;

    /// Keys starting with `prefix`, in backend order. One listing call only.
    async fn list_keys(&self, prefix: &str) -> BackendResult<Vec<String>>;

    async fn delete(&self, key: &str) -> BackendResult<()>;

    /// URL that lets its holder PUT `key` with the given content type.
    async fn presign_put(
        &self,
        key: &str,
        expires_in: Duration,
        content_type: &str,
    ) -> BackendResult<String>;

    /// URL that lets its holder GET `key`.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> BackendResult<String>;

    /// Cheap reachability check used by the readiness probe.
    async fn probe(&self) -> BackendResult<()>;
}

/// `ObjectBackend` over one bucket of an S3-compatible service.
#[derive(Clone, Debug)]
pub struct S3Backend {
    client: Client,
    bucket: String,
}

impl S3Backend {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build the shared client from static credentials.
    ///
    /// With an endpoint override (MinIO, RustFS, ...) path-style addressing
    /// is forced, since those services rarely serve virtual-hosted buckets.
    #[instrument(skip_all, fields(region = %cfg.region, bucket = %cfg.bucket))]
    pub async fn connect(cfg: &S3Config) -> Self {
        let credentials = Credentials::new(
            &cfg.access_key_id,
            cfg.secret_access_key.expose_secret(),
            None,
            None,
            "folder-gateway",
        );
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(credentials);
        if let Some(url) = &cfg.endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let shared = loader.load().await;

        // Presigned PUTs must not pin a checksum of a body the gateway never sees.
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(cfg.endpoint_url.is_some())
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();
        debug!("s3 client configured");
        Self::new(Client::from_conf(s3_config), cfg.bucket.clone())
    }

    fn presigning(key: &str, expires_in: Duration) -> BackendResult<PresigningConfig> {
        PresigningConfig::expires_in(expires_in).map_err(|err| BackendError::Presign {
            key: key.to_string(),
            message: err.to_string(),
        })
    }
}

#[async_trait]
impl ObjectBackend for S3Backend {
    async fn put_empty(&self, key: &str) -> BackendResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from_static(b""))
            .send()
            .await
            .map_err(|err| BackendError::Put {
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> BackendResult<Vec<String>> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .send()
            .await
            .map_err(|err| BackendError::List {
                prefix: prefix.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        if output.is_truncated().unwrap_or(false) {
            debug!(prefix, "listing truncated, returning the first page only");
        }

        Ok(output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_owned))
            .collect())
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| BackendError::Delete {
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }

    async fn presign_put(
        &self,
        key: &str,
        expires_in: Duration,
        content_type: &str,
    ) -> BackendResult<String> {
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(Self::presigning(key, expires_in)?)
            .await
            .map_err(|err| BackendError::Presign {
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(presigned.uri().to_string())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> BackendResult<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(Self::presigning(key, expires_in)?)
            .await
            .map_err(|err| BackendError::Presign {
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(presigned.uri().to_string())
    }

    async fn probe(&self) -> BackendResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|err| BackendError::Probe {
                bucket: self.bucket.clone(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }
}
