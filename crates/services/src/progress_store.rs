//! Store access layer: the only path between in-memory state and the
//! progress repository.
//!
//! Updates go through one FIFO write queue per topic. Enqueueing is
//! synchronous, so the order in which callers issue updates is the order in
//! which they reach storage, whatever the latency of individual writes.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use storage::repository::{ProgressRepository, StorageError};
use tokio::sync::{mpsc, oneshot};
use tracker_core::model::{Topic, TopicPatch, TopicPosition};
use tracker_core::seed::default_topics;
use tracker_core::validate::{parse_topics, validate_topics};

use crate::error::StoreError;

/// Tunables for storage access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Upper bound for any single repository call.
    pub op_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            op_timeout: Duration::from_secs(5),
        }
    }
}

enum WriteJob {
    Patch {
        patch: TopicPatch,
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
    Barrier(oneshot::Sender<()>),
}

/// Pending acknowledgment for a queued topic update.
#[must_use = "a write ticket does nothing unless awaited"]
pub struct WriteTicket {
    position: TopicPosition,
    reply: Result<oneshot::Receiver<Result<(), StoreError>>, StoreError>,
}

impl WriteTicket {
    #[must_use]
    pub fn position(&self) -> TopicPosition {
        self.position
    }

    /// Wait until the update is durably written (or has failed).
    ///
    /// # Errors
    ///
    /// Returns the `StoreError` of the write, or a connection error if the
    /// queue shut down before answering.
    pub async fn wait(self) -> Result<(), StoreError> {
        let rx = self.reply?;
        rx.await.unwrap_or_else(|_| {
            Err(StoreError::Storage(StorageError::Connection(
                "write queue closed".into(),
            )))
        })
    }

    fn failed(position: TopicPosition, err: StoreError) -> Self {
        Self {
            position,
            reply: Err(err),
        }
    }
}

/// Mediates every read, write, reset, import and export against the
/// progress repository.
#[derive(Clone)]
pub struct ProgressStore {
    repo: Arc<dyn ProgressRepository>,
    config: StoreConfig,
    queues: Arc<Mutex<HashMap<TopicPosition, mpsc::UnboundedSender<WriteJob>>>>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(repo: Arc<dyn ProgressRepository>, config: StoreConfig) -> Self {
        Self {
            repo,
            config,
            queues: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Load every topic in position order, seeding an empty store first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` on repository failure, timeout, or if the
    /// stored data is not a complete, consistent dataset.
    pub async fn read_all(&self) -> Result<Vec<Topic>, StoreError> {
        let seed = default_topics()?;
        let topics = with_timeout(self.config.op_timeout, self.repo.seed_if_empty(&seed)).await?;
        ensure_consistent(&topics)?;
        Ok(topics)
    }

    /// Like [`read_all`](Self::read_all) but never seeds: an empty store
    /// exports as an empty list.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` on repository failure or inconsistent data.
    pub async fn export_all(&self) -> Result<Vec<Topic>, StoreError> {
        let topics = with_timeout(self.config.op_timeout, self.repo.list_topics()).await?;
        if !topics.is_empty() {
            ensure_consistent(&topics)?;
        }
        Ok(topics)
    }

    /// Queue `patch` for the topic at `position` and return without waiting.
    ///
    /// Updates to the same topic are written strictly in the order this method
    /// was called. Must be called from within a Tokio runtime; otherwise the
    /// returned ticket resolves to an error.
    pub fn enqueue_update(&self, position: TopicPosition, patch: TopicPatch) -> WriteTicket {
        let (reply, rx) = oneshot::channel();
        match self.send(position, WriteJob::Patch { patch, reply }) {
            Ok(()) => WriteTicket {
                position,
                reply: Ok(rx),
            },
            Err(err) => WriteTicket::failed(position, err),
        }
    }

    /// Merge `patch` into the persisted topic at `position` and wait for it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the topic or an addressed question is
    /// missing, or `StoreError::Storage` on repository failure.
    pub async fn update(&self, position: TopicPosition, patch: TopicPatch) -> Result<(), StoreError> {
        self.enqueue_update(position, patch).wait().await
    }

    /// Wait until every update queued so far has been written or rejected.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the queues cannot be reached, in which
    /// case earlier updates may still be pending.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let positions: Vec<TopicPosition> = self
            .queues
            .lock()
            .map_err(poisoned)?
            .keys()
            .copied()
            .collect();

        let mut pending = Vec::with_capacity(positions.len());
        for position in positions {
            let (tx, rx) = oneshot::channel();
            self.send(position, WriteJob::Barrier(tx))?;
            pending.push(rx);
        }
        for rx in pending {
            // a dropped barrier means its worker exited with nothing left queued
            let _ = rx.await;
        }
        Ok(())
    }

    /// Delete all persisted progress. The next `read_all` re-seeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the store cannot be cleared.
    pub async fn reset_all(&self) -> Result<(), StoreError> {
        self.flush().await?;
        with_timeout(self.config.op_timeout, self.repo.clear()).await?;
        tracing::info!("progress store reset");
        Ok(())
    }

    /// Validate `topics` and atomically replace the whole store with them.
    ///
    /// Returns the data as read back from storage.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` (store untouched) if the data is not a
    /// well-formed dataset, or `StoreError::Storage` on repository failure.
    pub async fn import_all(&self, topics: Vec<Topic>) -> Result<Vec<Topic>, StoreError> {
        validate_topics(&topics)?;
        self.flush().await?;
        with_timeout(self.config.op_timeout, self.repo.replace_all(&topics)).await?;
        let stored = with_timeout(self.config.op_timeout, self.repo.list_topics()).await?;
        tracing::info!(topics = stored.len(), "progress imported");
        Ok(stored)
    }

    /// Parse a user-supplied export file and import it.
    ///
    /// # Errors
    ///
    /// Same as [`import_all`](Self::import_all); malformed JSON is a
    /// `StoreError::Validation`.
    pub async fn import_json(&self, bytes: &[u8]) -> Result<Vec<Topic>, StoreError> {
        let topics = parse_topics(bytes)?;
        self.import_all(topics).await
    }

    fn send(&self, position: TopicPosition, job: WriteJob) -> Result<(), StoreError> {
        let mut queues = self.queues.lock().map_err(poisoned)?;

        let job = match queues.get(&position) {
            Some(tx) => match tx.send(job) {
                Ok(()) => return Ok(()),
                // worker is gone; start a fresh one below
                Err(mpsc::error::SendError(job)) => job,
            },
            None => job,
        };

        let handle = tokio::runtime::Handle::try_current().map_err(|e| {
            StoreError::Storage(StorageError::Connection(format!("no async runtime: {e}")))
        })?;
        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run_write_queue(
            Arc::clone(&self.repo),
            self.config.op_timeout,
            position,
            rx,
        ));
        tx.send(job)
            .map_err(|_| StoreError::Storage(StorageError::Connection("write queue closed".into())))?;
        queues.insert(position, tx);
        Ok(())
    }
}

async fn run_write_queue(
    repo: Arc<dyn ProgressRepository>,
    op_timeout: Duration,
    position: TopicPosition,
    mut rx: mpsc::UnboundedReceiver<WriteJob>,
) {
    while let Some(job) = rx.recv().await {
        match job {
            WriteJob::Patch { patch, reply } => {
                let result = with_timeout(op_timeout, repo.patch_topic(position, &patch))
                    .await
                    .map(|_| ())
                    .map_err(|err| match err {
                        StorageError::NotFound => StoreError::NotFound(position),
                        other => StoreError::Storage(other),
                    });
                if let Err(err) = &result {
                    tracing::warn!(%position, error = %err, "topic write failed");
                }
                let _ = reply.send(result);
            }
            WriteJob::Barrier(done) => {
                let _ = done.send(());
            }
        }
    }
}

fn poisoned(e: impl std::fmt::Display) -> StoreError {
    StoreError::Storage(StorageError::Connection(format!("write queues unavailable: {e}")))
}

async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, StorageError>>,
) -> Result<T, StorageError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| StorageError::Timeout(limit))?
}

fn ensure_consistent(topics: &[Topic]) -> Result<(), StoreError> {
    validate_topics(topics).map_err(|e| {
        StoreError::Storage(StorageError::Serialization(format!(
            "stored progress is inconsistent: {e}"
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use tracker_core::model::QuestionPatch;

    fn store() -> (InMemoryRepository, ProgressStore) {
        let repo = InMemoryRepository::new();
        let store = ProgressStore::new(Arc::new(repo.clone()), StoreConfig::default());
        (repo, store)
    }

    #[tokio::test]
    async fn read_all_seeds_empty_store() {
        let (repo, store) = store();
        let topics = store.read_all().await.unwrap();
        assert_eq!(topics, default_topics().unwrap());
        assert_eq!(repo.list_topics().await.unwrap(), topics);
    }

    #[tokio::test]
    async fn export_of_empty_store_does_not_seed() {
        let (repo, store) = store();
        assert!(store.export_all().await.unwrap().is_empty());
        assert!(repo.list_topics().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_is_idempotent() {
        let (_, store) = store();
        store.read_all().await.unwrap();
        let patch = TopicPatch::single(1, QuestionPatch::new().done(true).notes("two pointers"));

        store.update(TopicPosition::new(2), patch.clone()).await.unwrap();
        let once = store.export_all().await.unwrap();
        store.update(TopicPosition::new(2), patch).await.unwrap();
        assert_eq!(store.export_all().await.unwrap(), once);
    }

    #[tokio::test]
    async fn update_unknown_topic_is_not_found() {
        let (_, store) = store();
        store.read_all().await.unwrap();
        let err = store
            .update(TopicPosition::new(40), TopicPatch::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(p) if p == TopicPosition::new(40)));
    }

    #[tokio::test]
    async fn inconsistent_store_is_reported_not_returned() {
        let (repo, store) = store();
        let mut topics = default_topics().unwrap();
        topics.truncate(3);
        repo.replace_all(&topics).await.unwrap();

        let err = store.read_all().await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Storage(StorageError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn poisoned_queues_stop_reset_before_it_clears() {
        let (repo, store) = store();
        store.read_all().await.unwrap();

        let queues = Arc::clone(&store.queues);
        std::thread::spawn(move || {
            let _guard = queues.lock().unwrap();
            panic!("worker registry poisoned");
        })
        .join()
        .unwrap_err();

        assert!(matches!(
            store.flush().await,
            Err(StoreError::Storage(StorageError::Connection(_)))
        ));
        assert!(store.reset_all().await.is_err());
        assert_eq!(repo.list_topics().await.unwrap().len(), 15);
    }

    #[test]
    fn enqueue_outside_runtime_fails_softly() {
        let (_, store) = store();
        let ticket = store.enqueue_update(TopicPosition::new(0), TopicPatch::new());
        assert!(ticket.reply.is_err());
    }
}
