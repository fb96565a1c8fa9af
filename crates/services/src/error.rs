//! Shared error types for the services crate.

use thiserror::Error;

use progress_core::model::GameId;
use storage::repository::StorageError;

/// Errors emitted by progress store implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressStoreError {
    #[error("game {0} is not part of the assignment")]
    MissingGame(GameId),
    #[error("progress store request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
