#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use services::{ProgressCoordinator, ProgressStore, StoreConfig};
use storage::repository::{InMemoryRepository, ProgressRepository, StorageError};
use tokio::sync::Notify;
use tracker_core::model::{Topic, TopicPatch, TopicPosition};

fn unavailable() -> StorageError {
    StorageError::Connection("disk unavailable".into())
}

/// In-memory repository whose operations can be switched to fail.
#[derive(Clone, Default)]
pub struct FlakyRepository {
    pub inner: InMemoryRepository,
    pub fail_reads: Arc<AtomicBool>,
    pub fail_writes: Arc<AtomicBool>,
    pub fail_clear: Arc<AtomicBool>,
    pub fail_replace: Arc<AtomicBool>,
}

#[async_trait]
impl ProgressRepository for FlakyRepository {
    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.list_topics().await
    }

    async fn seed_if_empty(&self, seed: &[Topic]) -> Result<Vec<Topic>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.seed_if_empty(seed).await
    }

    async fn patch_topic(
        &self,
        position: TopicPosition,
        patch: &TopicPatch,
    ) -> Result<Topic, StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.patch_topic(position, patch).await
    }

    async fn replace_all(&self, topics: &[Topic]) -> Result<(), StorageError> {
        if self.fail_replace.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.replace_all(topics).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.clear().await
    }
}

/// How the first `patch_topic` call behaves.
#[derive(Clone, Copy)]
pub enum FirstWrite {
    /// Sleep, then succeed.
    Slow(Duration),
    /// Block until the gate opens, then fail.
    GatedFailure,
}

/// Repository that treats its first write specially so ordering and
/// failure-recovery paths can be exercised deterministically.
#[derive(Clone)]
pub struct FirstWriteRepository {
    pub inner: InMemoryRepository,
    pub gate: Arc<Notify>,
    mode: FirstWrite,
    writes: Arc<AtomicUsize>,
}

impl FirstWriteRepository {
    pub fn new(mode: FirstWrite) -> Self {
        Self {
            inner: InMemoryRepository::new(),
            gate: Arc::new(Notify::new()),
            mode,
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ProgressRepository for FirstWriteRepository {
    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        self.inner.list_topics().await
    }

    async fn seed_if_empty(&self, seed: &[Topic]) -> Result<Vec<Topic>, StorageError> {
        self.inner.seed_if_empty(seed).await
    }

    async fn patch_topic(
        &self,
        position: TopicPosition,
        patch: &TopicPatch,
    ) -> Result<Topic, StorageError> {
        let nth = self.writes.fetch_add(1, Ordering::SeqCst);
        if nth == 0 {
            match self.mode {
                FirstWrite::Slow(delay) => tokio::time::sleep(delay).await,
                FirstWrite::GatedFailure => {
                    self.gate.notified().await;
                    return Err(unavailable());
                }
            }
        }
        self.inner.patch_topic(position, patch).await
    }

    async fn replace_all(&self, topics: &[Topic]) -> Result<(), StorageError> {
        self.inner.replace_all(topics).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear().await
    }
}

/// Repository whose `replace_all` and `clear` signal `entered`, then hold
/// until `gate` opens. Patches are slow so a late write would land last.
#[derive(Clone)]
pub struct GatedReplaceRepository {
    pub inner: InMemoryRepository,
    pub entered: Arc<Notify>,
    pub gate: Arc<Notify>,
}

impl GatedReplaceRepository {
    pub fn new() -> Self {
        Self {
            inner: InMemoryRepository::new(),
            entered: Arc::new(Notify::new()),
            gate: Arc::new(Notify::new()),
        }
    }

    async fn hold(&self) {
        self.entered.notify_one();
        self.gate.notified().await;
    }
}

#[async_trait]
impl ProgressRepository for GatedReplaceRepository {
    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        self.inner.list_topics().await
    }

    async fn seed_if_empty(&self, seed: &[Topic]) -> Result<Vec<Topic>, StorageError> {
        self.inner.seed_if_empty(seed).await
    }

    async fn patch_topic(
        &self,
        position: TopicPosition,
        patch: &TopicPatch,
    ) -> Result<Topic, StorageError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.inner.patch_topic(position, patch).await
    }

    async fn replace_all(&self, topics: &[Topic]) -> Result<(), StorageError> {
        self.hold().await;
        self.inner.replace_all(topics).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.hold().await;
        self.inner.clear().await
    }
}

/// Repository whose reads never complete.
pub struct HangingRepository;

#[async_trait]
impl ProgressRepository for HangingRepository {
    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        std::future::pending().await
    }

    async fn seed_if_empty(&self, _seed: &[Topic]) -> Result<Vec<Topic>, StorageError> {
        std::future::pending().await
    }

    async fn patch_topic(
        &self,
        _position: TopicPosition,
        _patch: &TopicPatch,
    ) -> Result<Topic, StorageError> {
        std::future::pending().await
    }

    async fn replace_all(&self, _topics: &[Topic]) -> Result<(), StorageError> {
        std::future::pending().await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        std::future::pending().await
    }
}

pub fn coordinator_over(repo: Arc<dyn ProgressRepository>) -> Arc<ProgressCoordinator> {
    Arc::new(ProgressCoordinator::new(ProgressStore::new(
        repo,
        StoreConfig::default(),
    )))
}
