use chrono::FixedOffset;
use tracing::{info, warn};

use focus_core::model::{DailyProgress, SessionId, StudySession, record_session, total_minutes};
use storage::repository::{FocusStore, StorageError};

/// In-memory mirror of the session history and daily aggregates.
///
/// Every change writes both full lists back to the store; the running total
/// is recomputed from the session list after each write.
#[derive(Clone)]
pub struct SessionJournal {
    store: FocusStore,
    offset: FixedOffset,
    sessions: Vec<StudySession>,
    daily: Vec<DailyProgress>,
    total_minutes: u64,
}

impl SessionJournal {
    /// Load sessions and daily progress from `store`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn load(store: FocusStore, offset: FixedOffset) -> Result<Self, StorageError> {
        let sessions = store.load_sessions().await?;
        let daily = store.load_daily_progress().await?;
        let total = total_minutes(&sessions);
        Ok(Self {
            store,
            offset,
            sessions,
            daily,
            total_minutes: total,
        })
    }

    /// Archive a new session: prepend it, fold it into its day, persist both lists.
    ///
    /// Returns the day record after the update. The in-memory lists change
    /// only after both writes succeed, so a failed write can be retried
    /// without counting the period twice.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either list cannot be written.
    pub async fn record(&mut self, session: StudySession) -> Result<DailyProgress, StorageError> {
        let mut daily = self.daily.clone();
        let day = record_session(&mut daily, &session, self.offset);
        let mut sessions = Vec::with_capacity(self.sessions.len() + 1);
        sessions.push(session);
        sessions.extend(self.sessions.iter().cloned());

        self.store.save_sessions(&sessions).await?;
        if let Err(err) = self.store.save_daily_progress(&daily).await {
            warn!(error = %err, "daily progress write failed, restoring session list");
            if let Err(restore) = self.store.save_sessions(&self.sessions).await {
                warn!(error = %restore, "session list restore failed");
            }
            return Err(err);
        }

        info!(
            session = %sessions[0].id(),
            minutes = sessions[0].duration_minutes(),
            date = %day.date(),
            "session recorded"
        );
        self.total_minutes = total_minutes(&sessions);
        self.sessions = sessions;
        self.daily = daily;
        Ok(day)
    }

    /// Attach a late reflection to an archived session and rewrite the session list.
    ///
    /// Daily progress is untouched. Returns false if no session has that id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session list cannot be written.
    pub async fn amend_reflection(
        &mut self,
        id: &SessionId,
        reflection: &str,
    ) -> Result<bool, StorageError> {
        let Some(index) = self.sessions.iter().position(|s| s.id() == id) else {
            warn!(session = %id, "cannot amend missing session");
            return Ok(false);
        };
        let mut sessions = self.sessions.clone();
        sessions[index].amend_user_reflection(reflection);
        self.store.save_sessions(&sessions).await?;
        self.sessions = sessions;
        info!(session = %id, "session reflection amended");
        Ok(true)
    }

    /// Most recent first.
    #[must_use]
    pub fn sessions(&self) -> &[StudySession] {
        &self.sessions
    }

    #[must_use]
    pub fn daily_progress(&self) -> &[DailyProgress] {
        &self.daily
    }

    #[must_use]
    pub fn total_minutes(&self) -> u64 {
        self.total_minutes
    }
}
