use crate::model::Task;

/// What the companion appears to be doing. Display-only, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanionStatus {
    Idle,
    Preparing,
    Working,
    Reflecting,
}

impl CompanionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CompanionStatus::Idle => "idle",
            CompanionStatus::Preparing => "preparing",
            CompanionStatus::Working => "working",
            CompanionStatus::Reflecting => "reflecting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionState {
    status: CompanionStatus,
    message: String,
    thought_process: Option<String>,
    task: Option<Task>,
}

impl CompanionState {
    #[must_use]
    pub fn idle(message: impl Into<String>) -> Self {
        Self {
            status: CompanionStatus::Idle,
            message: message.into(),
            thought_process: None,
            task: None,
        }
    }

    #[must_use]
    pub fn preparing(message: impl Into<String>, thought_process: impl Into<String>) -> Self {
        Self {
            status: CompanionStatus::Preparing,
            message: message.into(),
            thought_process: Some(thought_process.into()),
            task: None,
        }
    }

    #[must_use]
    pub fn working(message: impl Into<String>, task: Task) -> Self {
        Self {
            status: CompanionStatus::Working,
            message: message.into(),
            thought_process: None,
            task: Some(task),
        }
    }

    #[must_use]
    pub fn reflecting(message: impl Into<String>) -> Self {
        Self {
            status: CompanionStatus::Reflecting,
            message: message.into(),
            thought_process: None,
            task: None,
        }
    }

    /// Swap the spoken line, keeping status and task.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    #[must_use]
    pub fn status(&self) -> CompanionStatus {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn thought_process(&self) -> Option<&str> {
        self.thought_process.as_deref()
    }

    #[must_use]
    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }
}
