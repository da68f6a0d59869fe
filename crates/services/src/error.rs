//! Shared error types for the services crate.

use thiserror::Error;

use flagquiz_core::model::{CatalogError, QuizSettingsError};
use storage::repository::StorageError;

/// Errors emitted by `QuizSession` operations.
///
/// All of these are recoverable; the session state is unchanged when one is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("select an item first")]
    NoSelection,
    #[error("no turn in progress")]
    NoActiveTurn,
    #[error("turn already answered correctly")]
    AlreadyAnswered,
    #[error("unknown item `{0}`")]
    UnknownItem(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A mastery save that did not complete.
///
/// The in-memory set stays authoritative for the rest of the session.
#[derive(Debug, Error)]
#[error("failed to persist mastery record: {source}")]
pub struct PersistenceFailure {
    #[from]
    source: StorageError,
}

impl PersistenceFailure {
    #[must_use]
    pub fn storage_error(&self) -> &StorageError {
        &self.source
    }
}

/// Errors emitted while loading a catalog file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogLoadError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed catalog json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors emitted by `QuizSettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizSettingsServiceError {
    #[error(transparent)]
    Settings(#[from] QuizSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
