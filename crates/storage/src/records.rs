//! Persisted JSON shapes.
//!
//! These mirror the domain types so the store can serialize/deserialize without
//! leaking storage concerns into `focus-core`. Field names are camelCase and
//! task status is kebab-case, the layout the browser build writes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use focus_core::model::{
    AudioSettings, AudioSettingsDraft, AudioSettingsError, DEFAULT_VOLUME, DailyProgress,
    SessionId, SessionRecordError, StudySession, StudySessionDraft, Task, TaskError, TaskId,
    TaskStatus,
};

/// Why a record could not be turned back into a domain value.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RecordError {
    #[error("invalid id: {0}")]
    Id(String),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Session(#[from] SessionRecordError),
    #[error(transparent)]
    Audio(#[from] AudioSettingsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatusRecord {
    Pending,
    InProgress,
    Completed,
}

impl From<TaskStatus> for TaskStatusRecord {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Pending => Self::Pending,
            TaskStatus::InProgress => Self::InProgress,
            TaskStatus::Completed => Self::Completed,
        }
    }
}

impl From<TaskStatusRecord> for TaskStatus {
    fn from(status: TaskStatusRecord) -> Self {
        match status {
            TaskStatusRecord::Pending => Self::Pending,
            TaskStatusRecord::InProgress => Self::InProgress,
            TaskStatusRecord::Completed => Self::Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub content: String,
    pub duration: u32,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: TaskStatusRecord,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
}

impl TaskRecord {
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id().to_string(),
            content: task.content().to_owned(),
            duration: task.duration_minutes(),
            category: task.category().to_owned(),
            tags: task.tags().to_vec(),
            status: task.status().into(),
            created_at: task.created_at(),
            completed_at: task.completed_at(),
            reflection: task.reflection().map(str::to_owned),
        }
    }

    /// Convert the record back into a domain `Task`.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if the id is blank or the task fails validation.
    pub fn into_task(self) -> Result<Task, RecordError> {
        let id = TaskId::new(self.id).map_err(|e| RecordError::Id(e.to_string()))?;
        Ok(Task::from_persisted(
            id,
            self.content,
            self.duration,
            self.category,
            self.tags,
            self.status.into(),
            self.created_at,
            self.completed_at,
            self.reflection,
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: u32,
    pub user_task: TaskRecord,
    pub companion_task: TaskRecord,
    #[serde(default)]
    pub user_reflection: String,
    #[serde(default)]
    pub companion_reflection: String,
}

impl SessionRecord {
    #[must_use]
    pub fn from_session(session: &StudySession) -> Self {
        Self {
            id: session.id().to_string(),
            start_time: session.start_time(),
            end_time: session.end_time(),
            duration: session.duration_minutes(),
            user_task: TaskRecord::from_task(session.user_task()),
            companion_task: TaskRecord::from_task(session.companion_task()),
            user_reflection: session.user_reflection().to_owned(),
            companion_reflection: session.companion_reflection().to_owned(),
        }
    }

    /// Convert the record back into a domain `StudySession`.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if ids, tasks or the session invariants fail validation.
    pub fn into_session(self) -> Result<StudySession, RecordError> {
        let id = SessionId::new(self.id).map_err(|e| RecordError::Id(e.to_string()))?;
        Ok(StudySessionDraft {
            id,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_minutes: self.duration,
            user_task: self.user_task.into_task()?,
            companion_task: self.companion_task.into_task()?,
            user_reflection: self.user_reflection,
            companion_reflection: self.companion_reflection,
        }
        .validate()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgressRecord {
    pub date: NaiveDate,
    pub sessions_count: u32,
    pub total_duration: u32,
}

impl DailyProgressRecord {
    #[must_use]
    pub fn from_progress(progress: &DailyProgress) -> Self {
        Self {
            date: progress.date(),
            sessions_count: progress.sessions_count(),
            total_duration: progress.total_duration(),
        }
    }

    #[must_use]
    pub fn into_progress(self) -> DailyProgress {
        DailyProgress::from_persisted(self.date, self.sessions_count, self.total_duration)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSettingsRecord {
    pub enabled: bool,
    pub volume: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_track: Option<String>,
}

impl Default for AudioSettingsRecord {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: DEFAULT_VOLUME,
            current_track: None,
        }
    }
}

impl AudioSettingsRecord {
    #[must_use]
    pub fn from_settings(settings: &AudioSettings) -> Self {
        Self {
            enabled: settings.enabled(),
            volume: settings.volume(),
            current_track: settings.current_track().map(str::to_owned),
        }
    }

    /// Validate the record into domain settings.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Audio` if the stored volume is out of range.
    pub fn into_settings(self) -> Result<AudioSettings, RecordError> {
        Ok(AudioSettingsDraft {
            enabled: self.enabled,
            volume: self.volume,
            current_track: self.current_track,
        }
        .validate()?)
    }
}
