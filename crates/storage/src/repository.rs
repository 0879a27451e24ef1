use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

use focus_core::model::{AudioSettings, DailyProgress, StudySession, total_minutes};

use crate::records::{AudioSettingsRecord, DailyProgressRecord, SessionRecord};

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

/// The four named slots the app persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Sessions,
    DailyProgress,
    Tags,
    AudioSettings,
}

impl StoreKey {
    pub const ALL: [StoreKey; 4] = [
        StoreKey::Sessions,
        StoreKey::DailyProgress,
        StoreKey::Tags,
        StoreKey::AudioSettings,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Sessions => "study_sessions",
            StoreKey::DailyProgress => "daily_progress",
            StoreKey::Tags => "available_tags",
            StoreKey::AudioSettings => "audio_settings",
        }
    }
}

/// Text key-value backend. Values are replaced wholesale; there are no
/// partial updates and no transactions spanning keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw text stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the text stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// Simple in-memory backend for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value);
        Ok(())
    }
}

/// Typed access to the four slots on top of any `KeyValueStore`.
///
/// Reads never fail on bad data: an absent, unparsable or invalid slot reads
/// as its default and the problem is logged. Only backend failures surface.
#[derive(Clone)]
pub struct FocusStore {
    kv: Arc<dyn KeyValueStore>,
}

impl FocusStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    async fn read_slot<T>(&self, key: StoreKey) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned,
    {
        let Some(text) = self.kv.get(key.as_str()).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(slot = key.as_str(), error = %err, "unparsable slot, using default");
                Ok(None)
            }
        }
    }

    async fn write_slot<T>(&self, key: StoreKey, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let text =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        debug!(slot = key.as_str(), bytes = text.len(), "writing slot");
        self.kv.set(key.as_str(), text).await
    }

    /// Archived sessions, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend fails.
    pub async fn load_sessions(&self) -> Result<Vec<StudySession>, StorageError> {
        let records: Vec<SessionRecord> = self
            .read_slot(StoreKey::Sessions)
            .await?
            .unwrap_or_default();
        Ok(records
            .into_iter()
            .filter_map(|record| {
                let id = record.id.clone();
                record
                    .into_session()
                    .map_err(|err| {
                        warn!(
                            slot = StoreKey::Sessions.as_str(),
                            session = %id,
                            error = %err,
                            "skipping invalid session"
                        );
                    })
                    .ok()
            })
            .collect())
    }

    /// Replace the session list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be serialized or stored.
    pub async fn save_sessions(&self, sessions: &[StudySession]) -> Result<(), StorageError> {
        let records: Vec<SessionRecord> = sessions.iter().map(SessionRecord::from_session).collect();
        self.write_slot(StoreKey::Sessions, &records).await
    }

    /// Per-day aggregates, in stored order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend fails.
    pub async fn load_daily_progress(&self) -> Result<Vec<DailyProgress>, StorageError> {
        let records: Vec<DailyProgressRecord> = self
            .read_slot(StoreKey::DailyProgress)
            .await?
            .unwrap_or_default();
        Ok(records
            .into_iter()
            .map(DailyProgressRecord::into_progress)
            .collect())
    }

    /// Replace the per-day aggregates.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be serialized or stored.
    pub async fn save_daily_progress(&self, progress: &[DailyProgress]) -> Result<(), StorageError> {
        let records: Vec<DailyProgressRecord> = progress
            .iter()
            .map(DailyProgressRecord::from_progress)
            .collect();
        self.write_slot(StoreKey::DailyProgress, &records).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` only if the backend fails.
    pub async fn load_tags(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.read_slot(StoreKey::Tags).await?.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the tags cannot be stored.
    pub async fn save_tags(&self, tags: &[String]) -> Result<(), StorageError> {
        self.write_slot(StoreKey::Tags, tags).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` only if the backend fails.
    pub async fn load_audio_settings(&self) -> Result<AudioSettings, StorageError> {
        let record: AudioSettingsRecord = self
            .read_slot(StoreKey::AudioSettings)
            .await?
            .unwrap_or_default();
        Ok(record.into_settings().unwrap_or_else(|err| {
            warn!(slot = StoreKey::AudioSettings.as_str(), error = %err, "invalid settings, using default");
            AudioSettings::default()
        }))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    pub async fn save_audio_settings(&self, settings: &AudioSettings) -> Result<(), StorageError> {
        self.write_slot(
            StoreKey::AudioSettings,
            &AudioSettingsRecord::from_settings(settings),
        )
        .await
    }

    /// Sum of all persisted session durations, in minutes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend fails.
    pub async fn total_minutes(&self) -> Result<u64, StorageError> {
        Ok(total_minutes(&self.load_sessions().await?))
    }
}
