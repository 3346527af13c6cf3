use std::sync::Arc;

use storage::repository::Storage;
use tracker_core::Clock;
use tracker_core::model::Topic;

use crate::coordinator::ProgressCoordinator;
use crate::error::{AppServicesError, ExportError};
use crate::progress_store::{ProgressStore, StoreConfig};
use crate::report::{ProgressReport, to_json};

/// Output format for `TrackerServices::export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Report,
}

/// Composition root: owns the store access layer and the coordinator that
/// views are handed.
#[derive(Clone)]
pub struct TrackerServices {
    clock: Clock,
    store: ProgressStore,
    coordinator: Arc<ProgressCoordinator>,
}

impl TrackerServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        config: StoreConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, config, clock))
    }

    #[must_use]
    pub fn in_memory(config: StoreConfig, clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), config, clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, config: StoreConfig, clock: Clock) -> Self {
        let store = ProgressStore::new(Arc::clone(&storage.progress), config);
        let coordinator = Arc::new(ProgressCoordinator::new(store.clone()));
        Self {
            clock,
            store,
            coordinator,
        }
    }

    #[must_use]
    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    #[must_use]
    pub fn coordinator(&self) -> Arc<ProgressCoordinator> {
        Arc::clone(&self.coordinator)
    }

    /// Render the stored progress without seeding.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Empty` if nothing is stored, or the underlying
    /// store/serialization error.
    pub async fn export(&self, format: ExportFormat) -> Result<String, ExportError> {
        let topics = self.store.export_all().await?;
        render_export(&topics, format, &self.clock)
    }
}

fn render_export(
    topics: &[Topic],
    format: ExportFormat,
    clock: &Clock,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => to_json(topics),
        ExportFormat::Report if topics.is_empty() => Err(ExportError::Empty),
        ExportFormat::Report => Ok(ProgressReport::build(topics, clock).render_text()),
    }
}
