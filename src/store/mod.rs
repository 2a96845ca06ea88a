//! Learner progress persistence.
//!
//! A document-store collaborator keeps at most one record per user with
//! last-write-wins semantics.  [`JsonFileStore`] is the built-in
//! implementation, a JSON file in the app config directory; anything
//! heavier (MongoDB, etc.) plugs in behind the same trait.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// StoreError / ProgressRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("progress store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("progress store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One user's learning progress.  The `progress` payload is owned by the
/// UI collaborator; this crate stores it opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub topic: String,
    pub progress: serde_json::Value,
}

// ---------------------------------------------------------------------------
// ProgressStore trait
// ---------------------------------------------------------------------------

/// At-most-one record per user, last write wins.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn put(&self, user_id: &str, record: ProgressRecord) -> Result<(), StoreError>;
    async fn get(&self, user_id: &str) -> Result<Option<ProgressRecord>, StoreError>;
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// File-backed store: the whole map is rewritten on every `put`.
///
/// Fine for a single-process deployment; the map is tiny (one record per
/// known user).
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<HashMap<String, ProgressRecord>>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading existing records if the file is
    /// present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = Self::load(&path)?;
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    fn load(path: &Path) -> Result<HashMap<String, ProgressRecord>, StoreError> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self, records: &HashMap<String, ProgressRecord>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for JsonFileStore {
    async fn put(&self, user_id: &str, record: ProgressRecord) -> Result<(), StoreError> {
        let snapshot = {
            let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
            records.insert(user_id.to_string(), record);
            records.clone()
        };
        self.persist(&snapshot)
    }

    async fn get(&self, user_id: &str) -> Result<Option<ProgressRecord>, StoreError> {
        let records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        Ok(records.get(user_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store for tests and stateless deployments.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, ProgressRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn put(&self, user_id: &str, record: ProgressRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        records.insert(user_id.to_string(), record);
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<ProgressRecord>, StoreError> {
        let records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        Ok(records.get(user_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(topic: &str, score: u32) -> ProgressRecord {
        ProgressRecord {
            topic: topic.into(),
            progress: serde_json::json!({ "score": score }),
        }
    }

    #[tokio::test]
    async fn missing_user_is_absent() {
        let store = MemoryStore::new();
        assert!(store.get("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = MemoryStore::new();
        store.put("alice", record("fractions", 1)).await.unwrap();
        store.put("alice", record("algebra", 2)).await.unwrap();

        let got = store.get("alice").await.unwrap().unwrap();
        assert_eq!(got.topic, "algebra");
        assert_eq!(got.progress["score"], 2);
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("progress.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.put("bob", record("geometry", 7)).await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        let got = reopened.get("bob").await.unwrap().unwrap();
        assert_eq!(got.topic, "geometry");
        assert_eq!(got.progress["score"], 7);
    }

    #[tokio::test]
    async fn file_store_keeps_one_record_per_user() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("progress.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.put("carol", record("history", 1)).await.unwrap();
        store.put("carol", record("history", 9)).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let map: HashMap<String, ProgressRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["carol"].progress["score"], 9);
    }

    #[tokio::test]
    async fn empty_file_opens_clean() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("progress.json");
        std::fs::write(&path, "").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("anyone").await.unwrap().is_none());
    }
}
