use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::TaskId;

/// Category stamped on every task the companion picks for itself.
pub const COMPANION_CATEGORY: &str = "companion";

/// Category used when the user leaves it blank.
pub const DEFAULT_CATEGORY: &str = "学习";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TaskError {
    #[error("task content cannot be empty")]
    EmptyContent,

    #[error("task duration must be at least one minute")]
    ZeroDuration,

    #[error("task is already completed")]
    AlreadyCompleted,

    #[error("invalid persisted task: {0}")]
    InvalidPersistedState(String),
}

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

/// User input for a new task, validated into a `Task` on submission.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub content: String,
    pub duration_minutes: u32,
    pub category: String,
    pub tags: Vec<String>,
}

impl TaskDraft {
    #[must_use]
    pub fn new(content: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            content: content.into(),
            duration_minutes,
            category: DEFAULT_CATEGORY.to_string(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Validate the draft and stamp it as a pending task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::EmptyContent` if the content is blank after trimming.
    /// Returns `TaskError::ZeroDuration` if the duration is zero.
    pub fn validate(self, id: TaskId, created_at: DateTime<Utc>) -> Result<Task, TaskError> {
        let content = self.content.trim().to_string();
        if content.is_empty() {
            return Err(TaskError::EmptyContent);
        }
        if self.duration_minutes == 0 {
            return Err(TaskError::ZeroDuration);
        }
        let category = match self.category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            other => other.to_string(),
        };

        Ok(Task {
            id,
            content,
            duration_minutes: self.duration_minutes,
            category,
            tags: normalize_tags(self.tags),
            status: TaskStatus::Pending,
            created_at,
            completed_at: None,
            reflection: None,
        })
    }
}

/// A unit of focused work, owned either by the user or by the companion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    content: String,
    duration_minutes: u32,
    category: String,
    tags: Vec<String>,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    reflection: Option<String>,
}

impl Task {
    /// Build the companion's parallel task for a focus period.
    ///
    /// # Errors
    ///
    /// Returns `TaskError` if the content is blank or the duration is zero.
    pub fn companion(
        id: TaskId,
        content: impl Into<String>,
        duration_minutes: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TaskError> {
        TaskDraft::new(content, duration_minutes)
            .with_category(COMPANION_CATEGORY)
            .validate(id, created_at)
    }

    /// Rehydrate a task from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::InvalidPersistedState` if `completed_at` disagrees with the status,
    /// or the usual validation errors for content and duration.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: TaskId,
        content: String,
        duration_minutes: u32,
        category: String,
        tags: Vec<String>,
        status: TaskStatus,
        created_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
        reflection: Option<String>,
    ) -> Result<Self, TaskError> {
        let mut task = TaskDraft {
            content,
            duration_minutes,
            category,
            tags,
        }
        .validate(id, created_at)?;

        match (status, completed_at) {
            (TaskStatus::Completed, Some(at)) => {
                if at < created_at {
                    return Err(TaskError::InvalidPersistedState(
                        "completed before it was created".into(),
                    ));
                }
                task.status = TaskStatus::Completed;
                task.completed_at = Some(at);
            }
            (TaskStatus::Completed, None) => {
                return Err(TaskError::InvalidPersistedState(
                    "completed task without completion time".into(),
                ));
            }
            (_, Some(_)) => {
                return Err(TaskError::InvalidPersistedState(
                    "completion time on an open task".into(),
                ));
            }
            (open, None) => task.status = open,
        }
        if let Some(reflection) = reflection {
            task.set_reflection(reflection);
        }
        Ok(task)
    }

    #[must_use]
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn reflection(&self) -> Option<&str> {
        self.reflection.as_deref()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Move the task to `Completed`.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::AlreadyCompleted` if the task was already completed.
    pub fn mark_completed(&mut self, at: DateTime<Utc>) -> Result<(), TaskError> {
        if self.is_completed() {
            return Err(TaskError::AlreadyCompleted);
        }
        self.status = TaskStatus::Completed;
        self.completed_at = Some(at.max(self.created_at));
        Ok(())
    }

    /// Replace the reflection note. Blank text clears it.
    ///
    /// This is the only mutation allowed after completion.
    pub fn set_reflection(&mut self, reflection: impl Into<String>) {
        let reflection = reflection.into();
        let trimmed = reflection.trim();
        self.reflection = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }
}

// Trimmed, non-empty, first occurrence wins.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
