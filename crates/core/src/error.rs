use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::{AudioSettingsError, SessionRecordError, TagError, TaskError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Session(#[from] SessionRecordError),
    #[error(transparent)]
    Audio(#[from] AudioSettingsError),
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
