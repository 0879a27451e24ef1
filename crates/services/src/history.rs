use chrono::{DateTime, FixedOffset, Utc};

use focus_core::format::total_time_label;
use focus_core::heatmap::{HeatmapCell, month_cells, today_summary};
use focus_core::model::{DailyProgress, StudySession};
use focus_core::time::date_key;
use storage::repository::{FocusStore, StorageError};

/// Read-only queries over the archived sessions.
#[derive(Clone)]
pub struct HistoryService {
    store: FocusStore,
    offset: FixedOffset,
}

impl HistoryService {
    #[must_use]
    pub fn new(store: FocusStore, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    /// Up to `limit` sessions, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn recent_sessions(&self, limit: usize) -> Result<Vec<StudySession>, StorageError> {
        let mut sessions = self.store.load_sessions().await?;
        sessions.truncate(limit);
        Ok(sessions)
    }

    /// The record for the calendar day containing `now`, or an empty one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn today(&self, now: DateTime<Utc>) -> Result<DailyProgress, StorageError> {
        let progress = self.store.load_daily_progress().await?;
        Ok(today_summary(&progress, date_key(now, self.offset)))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn month(&self, year: i32, month: u32) -> Result<Vec<HeatmapCell>, StorageError> {
        let progress = self.store.load_daily_progress().await?;
        Ok(month_cells(&progress, year, month))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn total_label(&self) -> Result<String, StorageError> {
        Ok(total_time_label(self.store.total_minutes().await?))
    }
}
