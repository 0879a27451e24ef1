use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use thiserror::Error;

use crate::model::{SessionId, Task};
use crate::time::date_key;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionRecordError {
    #[error("end_time is before start_time")]
    InvalidTimeRange,

    #[error("session duration must be at least one minute")]
    ZeroDuration,

    #[error("{which} task must be completed before it is archived")]
    OpenTask { which: &'static str },

    #[error("companion reflection cannot be empty")]
    EmptyCompanionReflection,
}

/// Unvalidated parts of a `StudySession`.
#[derive(Debug, Clone)]
pub struct StudySessionDraft {
    pub id: SessionId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub user_task: Task,
    pub companion_task: Task,
    pub user_reflection: String,
    pub companion_reflection: String,
}

impl StudySessionDraft {
    /// Validate the draft into an archived session.
    ///
    /// # Errors
    ///
    /// Returns `SessionRecordError` if the time range is inverted, the duration is zero,
    /// either task is still open, or the companion reflection is blank.
    pub fn validate(self) -> Result<StudySession, SessionRecordError> {
        if self.end_time < self.start_time {
            return Err(SessionRecordError::InvalidTimeRange);
        }
        if self.duration_minutes == 0 {
            return Err(SessionRecordError::ZeroDuration);
        }
        if !self.user_task.is_completed() {
            return Err(SessionRecordError::OpenTask { which: "user" });
        }
        if !self.companion_task.is_completed() {
            return Err(SessionRecordError::OpenTask { which: "companion" });
        }
        let companion_reflection = self.companion_reflection.trim().to_string();
        if companion_reflection.is_empty() {
            return Err(SessionRecordError::EmptyCompanionReflection);
        }

        Ok(StudySession {
            id: self.id,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_minutes: self.duration_minutes,
            user_task: self.user_task,
            companion_task: self.companion_task,
            user_reflection: self.user_reflection.trim().to_string(),
            companion_reflection,
        })
    }
}

/// An archived focus period: both tasks, timings and the paired reflections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySession {
    id: SessionId,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    duration_minutes: u32,
    user_task: Task,
    companion_task: Task,
    user_reflection: String,
    companion_reflection: String,
}

impl StudySession {
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[must_use]
    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn user_task(&self) -> &Task {
        &self.user_task
    }

    #[must_use]
    pub fn companion_task(&self) -> &Task {
        &self.companion_task
    }

    #[must_use]
    pub fn user_reflection(&self) -> &str {
        &self.user_reflection
    }

    #[must_use]
    pub fn companion_reflection(&self) -> &str {
        &self.companion_reflection
    }

    /// Calendar day this session counts towards.
    #[must_use]
    pub fn date_key(&self, offset: FixedOffset) -> NaiveDate {
        date_key(self.start_time, offset)
    }

    /// Attach a reflection written after the session was archived.
    ///
    /// Updates both the session-level note and the user task snapshot.
    pub fn amend_user_reflection(&mut self, reflection: &str) {
        self.user_reflection = reflection.trim().to_string();
        self.user_task.set_reflection(reflection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TaskDraft, TaskId};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn completed(content: &str) -> Task {
        let mut task = TaskDraft::new(content, 25)
            .validate(TaskId::generate(), fixed_now())
            .unwrap();
        task.mark_completed(fixed_now() + Duration::minutes(25))
            .unwrap();
        task
    }

    fn draft() -> StudySessionDraft {
        StudySessionDraft {
            id: SessionId::generate(),
            start_time: fixed_now(),
            end_time: fixed_now() + Duration::minutes(25),
            duration_minutes: 25,
            user_task: completed("写周报"),
            companion_task: completed("修复Bug"),
            user_reflection: String::new(),
            companion_reflection: "完成了部分功能，明天继续加油".into(),
        }
    }

    #[test]
    fn valid_draft_becomes_session() {
        let session = draft().validate().unwrap();
        assert_eq!(session.duration_minutes(), 25);
        assert_eq!(session.user_reflection(), "");
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut d = draft();
        d.end_time = d.start_time - Duration::seconds(1);
        assert_eq!(d.validate(), Err(SessionRecordError::InvalidTimeRange));
    }

    #[test]
    fn open_task_is_rejected() {
        let mut d = draft();
        d.companion_task = TaskDraft::new("x", 5)
            .validate(TaskId::generate(), fixed_now())
            .unwrap();
        assert_eq!(
            d.validate(),
            Err(SessionRecordError::OpenTask { which: "companion" })
        );
    }

    #[test]
    fn blank_companion_reflection_is_rejected() {
        let mut d = draft();
        d.companion_reflection = "  ".into();
        assert_eq!(
            d.validate(),
            Err(SessionRecordError::EmptyCompanionReflection)
        );
    }

    #[test]
    fn amending_reflection_updates_task_snapshot() {
        let mut session = draft().validate().unwrap();
        session.amend_user_reflection(" 写完了 ");
        assert_eq!(session.user_reflection(), "写完了");
        assert_eq!(session.user_task().reflection(), Some("写完了"));
    }
}
