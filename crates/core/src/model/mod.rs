mod audio;
mod companion;
mod ids;
mod progress;
mod session;
mod tag;
mod task;

pub use ids::{ParseIdError, SessionId, TaskId};

pub use audio::{AudioSettings, AudioSettingsDraft, AudioSettingsError, DEFAULT_VOLUME};
pub use companion::{CompanionState, CompanionStatus};
pub use progress::{DailyProgress, aggregate_sessions, record_session, total_minutes};
pub use session::{SessionRecordError, StudySession, StudySessionDraft};
pub use tag::{TagError, TagName};
pub use task::{COMPANION_CATEGORY, DEFAULT_CATEGORY, Task, TaskDraft, TaskError, TaskStatus};
