#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod history;
pub mod lifecycle;

pub use focus_core::Clock;

pub use app_services::AppServices;
pub use config::{FocusConfig, LifecycleTimings};
pub use error::{AppServicesError, ConfigError, LifecycleError};
pub use history::HistoryService;
pub use lifecycle::{
    ExitOutcome, FocusController, LifecycleEvent, Phase, ReflectionOutcome, SessionJournal,
};
