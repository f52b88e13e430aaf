//! In-memory `ObjectBackend` that records every call, for handler and
//! service tests.

use super::backend::{BackendError, BackendResult, ObjectBackend};
use async_trait::async_trait;
use std::{
    collections::BTreeSet,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

/// Detail placed in injected failures; responses must never contain it.
pub const FAILURE_DETAIL: &str = "AccessDenied: arn:aws:s3:::internal-bucket";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    PutEmpty(String),
    List(String),
    Delete(String),
    PresignPut {
        key: String,
        expires_in: Duration,
        content_type: String,
    },
    PresignGet {
        key: String,
        expires_in: Duration,
    },
    Probe,
}

#[derive(Default)]
pub struct RecordingBackend {
    objects: Mutex<BTreeSet<String>>,
    calls: Mutex<Vec<BackendCall>>,
    failing: AtomicBool,
}

impl RecordingBackend {
    pub fn with_objects<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let backend = Self::default();
        backend
            .objects
            .lock()
            .unwrap()
            .extend(keys.into_iter().map(str::to_owned));
        backend
    }

    /// Make every following call fail.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains(key)
    }

    fn record(&self, call: BackendCall) -> Result<(), String> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            Err(FAILURE_DETAIL.to_string())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ObjectBackend for RecordingBackend {
    async fn put_empty(&self, key: &str) -> BackendResult<()> {
        self.record(BackendCall::PutEmpty(key.to_string()))
            .map_err(|message| BackendError::Put {
                key: key.to_string(),
                message,
            })?;
        self.objects.lock().unwrap().insert(key.to_string());
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> BackendResult<Vec<String>> {
        self.record(BackendCall::List(prefix.to_string()))
            .map_err(|message| BackendError::List {
                prefix: prefix.to_string(),
                message,
            })?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        self.record(BackendCall::Delete(key.to_string()))
            .map_err(|message| BackendError::Delete {
                key: key.to_string(),
                message,
            })?;
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn presign_put(
        &self,
        key: &str,
        expires_in: Duration,
        content_type: &str,
    ) -> BackendResult<String> {
        self.record(BackendCall::PresignPut {
            key: key.to_string(),
            expires_in,
            content_type: content_type.to_string(),
        })
        .map_err(|message| BackendError::Presign {
            key: key.to_string(),
            message,
        })?;
        Ok(format!(
            "https://storage.test/{key}?verb=PUT&expires={}",
            expires_in.as_secs()
        ))
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> BackendResult<String> {
        self.record(BackendCall::PresignGet {
            key: key.to_string(),
            expires_in,
        })
        .map_err(|message| BackendError::Presign {
            key: key.to_string(),
            message,
        })?;
        Ok(format!(
            "https://storage.test/{key}?verb=GET&expires={}",
            expires_in.as_secs()
        ))
    }

    async fn probe(&self) -> BackendResult<()> {
        self.record(BackendCall::Probe)
            .map_err(|message| BackendError::Probe {
                bucket: "test".into(),
                message,
            })
    }
}
