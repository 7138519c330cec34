use async_trait::async_trait;
use drill_core::model::{PracticeSettings, SessionSummary};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::keyed::{KeyedHistory, KeyedSettings};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Flat string key-value contract every backend provides.
///
/// Values are JSON text.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value; removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Repository contract for practice settings.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Fetch stored settings, or `None` when nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_settings(&self) -> Result<Option<PracticeSettings>, StorageError>;

    /// Persist settings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &PracticeSettings) -> Result<(), StorageError>;
}

/// A source and sink of session summaries, most recent first.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Record a finished session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the summary cannot be stored.
    async fn append(&self, summary: &SessionSummary) -> Result<(), StorageError>;

    /// Up to `limit` summaries, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list(&self, limit: usize) -> Result<Vec<SessionSummary>, StorageError>;

    /// The most recently recorded summary.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn latest(&self) -> Result<Option<SessionSummary>, StorageError>;

    /// Overwrite the stored history with `summaries` (most recent first).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the summaries cannot be stored.
    async fn replace_all(&self, summaries: &[SessionSummary]) -> Result<(), StorageError>;
}

/// Simple in-memory key-value store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
    pub settings: Arc<dyn SettingsRepository>,
    pub history: Arc<dyn HistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_kv(Arc::new(InMemoryStore::new()))
    }

    /// Settings and history laid out as keys of a single key-value store.
    #[must_use]
    pub fn from_kv(kv: Arc<dyn KeyValueStore>) -> Self {
        let settings: Arc<dyn SettingsRepository> = Arc::new(KeyedSettings::new(Arc::clone(&kv)));
        let history: Arc<dyn HistoryRepository> = Arc::new(KeyedHistory::new(Arc::clone(&kv)));
        Self {
            kv,
            settings,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_store_sets_overwrites_and_removes() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("lengthSec").await.unwrap(), None);

        store.set("lengthSec", "30").await.unwrap();
        store.set("lengthSec", "120").await.unwrap();
        assert_eq!(
            store.get("lengthSec").await.unwrap().as_deref(),
            Some("120")
        );

        store.remove("lengthSec").await.unwrap();
        store.remove("lengthSec").await.unwrap();
        assert_eq!(store.get("lengthSec").await.unwrap(), None);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store.set("ops", "{}").await.unwrap();
        assert!(other.get("ops").await.unwrap().is_some());
    }
}
