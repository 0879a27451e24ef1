use focus_core::model::{CompanionStatus, SessionId};

/// Where the controller is in the focus lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    /// Companion is deliberating over its own task.
    Preparing,
    Working,
    /// Reflection prompt is open.
    Reflecting,
    /// Reflection captured; waiting to return to idle.
    Settling,
}

impl Phase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Preparing => "preparing",
            Phase::Working => "working",
            Phase::Reflecting => "reflecting",
            Phase::Settling => "settling",
        }
    }

    /// Companion status shown for this phase.
    #[must_use]
    pub fn companion_status(self) -> CompanionStatus {
        match self {
            Phase::Idle => CompanionStatus::Idle,
            Phase::Preparing => CompanionStatus::Preparing,
            Phase::Working => CompanionStatus::Working,
            Phase::Reflecting | Phase::Settling => CompanionStatus::Reflecting,
        }
    }
}

/// Payload of the timers the controller arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    CompanionReady,
    CountdownTick,
    RotateMessage,
    ResetToIdle,
}

/// Observable results of advancing time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The companion picked its task and the focus period started.
    CompanionAssigned { task: String },
    FocusTick { remaining_secs: u32 },
    /// The countdown reached zero and the reflection prompt opened.
    FocusCompleted,
    MessageRotated { message: String },
    ReturnedToIdle,
}

/// Result of an exit-focus intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Not focusing, or a task reference was missing.
    Ignored,
    /// Less than a minute elapsed; nothing was recorded.
    Discarded,
    /// A partial session was archived and the reflection prompt opened.
    Recorded(SessionId),
}

/// Result of a reflection intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectionOutcome {
    Ignored,
    /// A new session was archived.
    Recorded(SessionId),
    /// The session archived at early exit now carries the reflection.
    Amended(SessionId),
    /// Early exit followed by an empty reflection; the record stays as is.
    Unchanged(SessionId),
}
