use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracker_core::model::{Topic, TopicPatch, TopicPosition};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Repository contract for the local progress store.
///
/// One document per topic, keyed by position. Every method either applies
/// fully or not at all.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch every stored topic ordered by position.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or a document is corrupt.
    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError>;

    /// Write `seed` if the store holds no topics, then return the stored topics.
    ///
    /// The emptiness check and the insert happen in one atomic step.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or written.
    async fn seed_if_empty(&self, seed: &[Topic]) -> Result<Vec<Topic>, StorageError>;

    /// Merge `patch` into the stored document at `position`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the topic or an addressed question
    /// is missing, or other storage errors.
    async fn patch_topic(
        &self,
        position: TopicPosition,
        patch: &TopicPatch,
    ) -> Result<Topic, StorageError>;

    /// Atomically replace the entire store with `topics`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the replacement cannot be committed.
    async fn replace_all(&self, topics: &[Topic]) -> Result<(), StorageError>;

    /// Delete every stored topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be cleared.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    topics: Arc<Mutex<BTreeMap<TopicPosition, Topic>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<TopicPosition, Topic>>, StorageError> {
        self.topics
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.values().cloned().collect())
    }

    async fn seed_if_empty(&self, seed: &[Topic]) -> Result<Vec<Topic>, StorageError> {
        let mut guard = self.lock()?;
        if guard.is_empty() {
            for topic in seed {
                guard.insert(topic.position(), topic.clone());
            }
        }
        Ok(guard.values().cloned().collect())
    }

    async fn patch_topic(
        &self,
        position: TopicPosition,
        patch: &TopicPatch,
    ) -> Result<Topic, StorageError> {
        let mut guard = self.lock()?;
        let current = guard.get(&position).ok_or(StorageError::NotFound)?;
        let updated = current
            .apply_patch(patch)
            .map_err(|_| StorageError::NotFound)?;
        guard.insert(position, updated.clone());
        Ok(updated)
    }

    async fn replace_all(&self, topics: &[Topic]) -> Result<(), StorageError> {
        let next: BTreeMap<_, _> = topics.iter().map(|t| (t.position(), t.clone())).collect();
        let mut guard = self.lock()?;
        *guard = next;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.lock()?.clear();
        Ok(())
    }
}

/// Aggregates the progress repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}
