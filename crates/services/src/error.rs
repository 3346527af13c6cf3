//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use tracker_core::model::{TopicError, TopicPosition};
use tracker_core::seed::SeedError;
use tracker_core::validate::ValidationError;

/// Errors emitted by `ProgressStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("topic {0} not found")]
    NotFound(TopicPosition),
    #[error(transparent)]
    Seed(#[from] SeedError),
}

/// Errors emitted by `ProgressCoordinator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoordinatorError {
    #[error("progress has not finished loading")]
    NotLoaded,
    #[error("topic {0} not found")]
    TopicNotFound(TopicPosition),
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted while rendering exports.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error("nothing to export: the progress store is empty")]
    Empty,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
