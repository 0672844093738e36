use crate::errors::StoreError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};

const EMPTY_DOCUMENT: &[u8] = b"[]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    Today,
    History,
    Events,
    PredictedWeekly,
    PredictedMonthly,
    MetricsWeekly,
    MetricsMonthly,
}

impl DocumentKey {
    pub const ALL: [DocumentKey; 7] = [
        DocumentKey::Today,
        DocumentKey::History,
        DocumentKey::Events,
        DocumentKey::PredictedWeekly,
        DocumentKey::PredictedMonthly,
        DocumentKey::MetricsWeekly,
        DocumentKey::MetricsMonthly,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            DocumentKey::Today => "todaysserving.json",
            DocumentKey::History => "dataformodel.json",
            DocumentKey::Events => "events.json",
            DocumentKey::PredictedWeekly => "predicted_weekly.json",
            DocumentKey::PredictedMonthly => "predicted_monthly.json",
            DocumentKey::MetricsWeekly => "metrics_weekly.json",
            DocumentKey::MetricsMonthly => "metrics_monthly.json",
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Raw persistence for whole JSON documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates the document as an empty array if it does not exist yet.
    async fn ensure_exists(&self, key: DocumentKey) -> Result<(), StoreError>;
    async fn load(&self, key: DocumentKey) -> Result<Vec<u8>, StoreError>;
    /// Replaces the document in full.
    async fn save(&self, key: DocumentKey, payload: &[u8]) -> Result<(), StoreError>;
}

/// One file per document inside `dir`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, key: DocumentKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn temp_path(&self, key: DocumentKey) -> PathBuf {
        self.dir.join(format!(".{}.tmp", key.file_name()))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn ensure_exists(&self, key: DocumentKey) -> Result<(), StoreError> {
        match fs::try_exists(self.path(key)).await {
            Ok(true) => Ok(()),
            Ok(false) => self.save(key, EMPTY_DOCUMENT).await,
            Err(source) => Err(StoreError::Io { key, source }),
        }
    }

    async fn load(&self, key: DocumentKey) -> Result<Vec<u8>, StoreError> {
        fs::read(self.path(key))
            .await
            .map_err(|source| StoreError::Io { key, source })
    }

    async fn save(&self, key: DocumentKey, payload: &[u8]) -> Result<(), StoreError> {
        let io = |source| StoreError::Io { key, source };
        let temp = self.temp_path(key);

        let mut file = fs::File::create(&temp).await.map_err(io)?;
        file.write_all(payload).await.map_err(io)?;
        file.sync_all().await.map_err(io)?;
        drop(file);

        fs::rename(&temp, self.path(key)).await.map_err(io)
    }
}

/// Keeps documents in memory; used by tests and tooling that must not touch disk.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<DocumentKey, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_exists(&self, key: DocumentKey) -> Result<(), StoreError> {
        self.documents
            .lock()
            .await
            .entry(key)
            .or_insert_with(|| EMPTY_DOCUMENT.to_vec());
        Ok(())
    }

    async fn load(&self, key: DocumentKey) -> Result<Vec<u8>, StoreError> {
        self.documents
            .lock()
            .await
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::Io {
                key,
                source: ErrorKind::NotFound.into(),
            })
    }

    async fn save(&self, key: DocumentKey, payload: &[u8]) -> Result<(), StoreError> {
        self.documents.lock().await.insert(key, payload.to_vec());
        Ok(())
    }
}

/// Typed access to the documents, with every access to a key serialized
/// through that key's mutex.
///
/// Work spanning several documents must lock `Today` before `History`.
pub struct Store {
    backend: Arc<dyn DocumentStore>,
    locks: [Mutex<()>; DocumentKey::ALL.len()],
}

impl Store {
    pub fn new(backend: Arc<dyn DocumentStore>) -> Self {
        Self {
            backend,
            locks: std::array::from_fn(|_| Mutex::new(())),
        }
    }

    pub fn file(dir: impl AsRef<Path>) -> Self {
        Self::new(Arc::new(FileStore::new(dir.as_ref())))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn lock(&self, key: DocumentKey) -> DocumentGuard<'_> {
        let _guard = self.locks[key as usize].lock().await;
        DocumentGuard {
            backend: self.backend.as_ref(),
            key,
            _guard,
        }
    }

    pub async fn ensure_all(&self) -> Result<(), StoreError> {
        for key in DocumentKey::ALL {
            let _guard = self.lock(key).await;
            self.backend.ensure_exists(key).await?;
        }
        Ok(())
    }

    pub async fn read<T: DeserializeOwned>(&self, key: DocumentKey) -> Result<T, StoreError> {
        self.lock(key).await.read().await
    }

    pub async fn write<T: Serialize + ?Sized>(
        &self,
        key: DocumentKey,
        document: &T,
    ) -> Result<(), StoreError> {
        self.lock(key).await.write(document).await
    }

    /// Read-modify-write of one document without interleaving other writers.
    pub async fn update<T, R>(
        &self,
        key: DocumentKey,
        apply: impl FnOnce(&mut T) -> R + Send,
    ) -> Result<R, StoreError>
    where
        T: DeserializeOwned + Serialize + Send,
        R: Send,
    {
        let guard = self.lock(key).await;
        let mut document: T = guard.read().await?;
        let result = apply(&mut document);
        guard.write(&document).await?;
        Ok(result)
    }

    /// Reads a singleton summary: the object itself, or the first element of
    /// an array, or `{}` when there is nothing.
    pub async fn read_summary(&self, key: DocumentKey) -> Result<Value, StoreError> {
        let raw: Value = self.read(key).await?;
        Ok(match raw {
            Value::Array(items) => items
                .into_iter()
                .next()
                .unwrap_or_else(|| Value::Object(Default::default())),
            Value::Null => Value::Object(Default::default()),
            other => other,
        })
    }
}

/// Exclusive access to one document for as long as the guard lives.
pub struct DocumentGuard<'a> {
    backend: &'a dyn DocumentStore,
    key: DocumentKey,
    _guard: MutexGuard<'a, ()>,
}

impl DocumentGuard<'_> {
    pub async fn read<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        self.backend.ensure_exists(self.key).await?;
        let bytes = self.backend.load(self.key).await?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
            key: self.key,
            source,
        })
    }

    pub async fn write<T: Serialize + ?Sized>(&self, document: &T) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(document).map_err(|source| StoreError::Encode {
            key: self.key,
            source,
        })?;
        self.backend.save(self.key, &payload).await
    }
}
