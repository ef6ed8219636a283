//! In-memory storage for tests

use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
struct MockBlob {
    data: Bytes,
    last_modified: DateTime<Utc>,
}

/// Mock storage that keeps blobs in memory and can be told to fail.
#[derive(Clone, Default)]
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, MockBlob>>>,
    fail_put: Arc<AtomicBool>,
    fail_delete: Arc<AtomicBool>,
    fail_presign: Arc<AtomicBool>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail
    pub fn fail_puts(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `delete` fail
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_presigns(&self, fail: bool) {
        self.fail_presign.store(fail, Ordering::SeqCst);
    }

    /// Sleep this long inside every call, to exercise caller timeouts
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Insert a blob directly, bypassing failure injection
    pub fn insert_file(&self, key: &str, data: &[u8], last_modified: DateTime<Utc>) {
        self.files.lock().unwrap().insert(
            key.to_string(),
            MockBlob {
                data: Bytes::copy_from_slice(data),
                last_modified,
            },
        );
    }

    pub fn has_file(&self, key: &str) -> bool {
        self.files.lock().unwrap().contains_key(key)
    }

    pub fn get_file(&self, key: &str) -> Option<Bytes> {
        self.files.lock().unwrap().get(key).map(|b| b.data.clone())
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    async fn maybe_sleep(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn put(&self, storage_key: &str, data: Bytes, _content_type: &str) -> StorageResult<()> {
        self.maybe_sleep().await;
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("injected put failure".to_string()));
        }
        self.files.lock().unwrap().insert(
            storage_key.to_string(),
            MockBlob {
                data,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.maybe_sleep().await;
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("injected delete failure".to_string()));
        }
        self.files.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.maybe_sleep().await;
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("injected presign failure".to_string()));
        }
        Ok(format!(
            "https://blobs.example.com/{}?expires={}",
            storage_key,
            expires_in.as_secs()
        ))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.has_file(storage_key))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<StoredObject>> {
        let files = self.files.lock().unwrap();
        let mut objects: Vec<StoredObject> = files
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, blob)| StoredObject {
                key: key.clone(),
                size: blob.data.len() as u64,
                last_modified: blob.last_modified,
            })
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
