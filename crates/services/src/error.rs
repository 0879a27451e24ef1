//! Shared error types for the services crate.

use thiserror::Error;

use focus_core::catalog::CatalogError;
use focus_core::model::{AudioSettingsError, SessionRecordError, TagError, TaskError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `FocusController`.
///
/// Stale or out-of-phase intents are not errors; they report an ignored
/// outcome instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LifecycleError {
    #[error("a focus session is already in progress")]
    Busy,
    #[error("unknown character: {0}")]
    UnknownCharacter(String),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Session(#[from] SessionRecordError),
    #[error(transparent)]
    Audio(#[from] AudioSettingsError),
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while reading configuration from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid {var} value: {raw}")]
    InvalidValue { var: &'static str, raw: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}
