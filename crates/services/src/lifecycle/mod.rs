mod controller;
mod journal;
mod phase;

// Public API of the focus lifecycle.
pub use crate::error::LifecycleError;
pub use controller::{FocusController, THOUGHT_PROCESS};
pub use journal::SessionJournal;
pub use phase::{ExitOutcome, LifecycleEvent, Phase, ReflectionOutcome, TimerEvent};
