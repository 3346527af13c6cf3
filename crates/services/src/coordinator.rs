//! In-memory source of truth for every view.
//!
//! State lives in a `watch` channel: views read the latest
//! [`ProgressSnapshot`] or subscribe to changes, and every mutation goes
//! through [`ProgressCoordinator`]. Topic entries are replaced, never mutated
//! in place, so a snapshot taken by a reader never changes under it.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracker_core::model::{Topic, TopicPatch, TopicPosition, TopicProgress};
use tracker_core::validate::validate_topics;

use crate::error::{CoordinatorError, StoreError};
use crate::progress_store::{ProgressStore, WriteTicket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-facing message produced by the last operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Immutable view of the coordinator state at one point in time.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    status: LoadStatus,
    topics: Arc<Vec<Arc<Topic>>>,
    unsynced: BTreeSet<TopicPosition>,
    notice: Option<Notice>,
    // bumped on every wholesale replace; stale write failures are ignored
    epoch: u64,
    revisions: Vec<u64>,
}

impl ProgressSnapshot {
    fn loading() -> Self {
        Self {
            status: LoadStatus::Loading,
            topics: Arc::new(Vec::new()),
            unsynced: BTreeSet::new(),
            notice: None,
            epoch: 0,
            revisions: Vec::new(),
        }
    }

    #[must_use]
    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == LoadStatus::Ready
    }

    #[must_use]
    pub fn topics(&self) -> &[Arc<Topic>] {
        &self.topics
    }

    #[must_use]
    pub fn topic(&self, position: TopicPosition) -> Option<&Topic> {
        self.topics.get(position.index()).map(|t| &**t)
    }

    /// Topics whose in-memory state may differ from storage after a failed write.
    #[must_use]
    pub fn unsynced(&self) -> &BTreeSet<TopicPosition> {
        &self.unsynced
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Progress summed over all topics.
    #[must_use]
    pub fn progress(&self) -> TopicProgress {
        self.topics.iter().map(|t| t.progress()).sum()
    }

    fn replace_topic(&mut self, index: usize, topic: Arc<Topic>) {
        let mut next = self.topics.as_ref().clone();
        next[index] = topic;
        self.topics = Arc::new(next);
    }
}

struct StagedWrite {
    ticket: WriteTicket,
    previous: Arc<Topic>,
    updated: Arc<Topic>,
    epoch: u64,
    revision: u64,
}

/// Keeps the in-memory dataset and the progress store in step.
pub struct ProgressCoordinator {
    store: ProgressStore,
    state: watch::Sender<ProgressSnapshot>,
}

impl ProgressCoordinator {
    #[must_use]
    pub fn new(store: ProgressStore) -> Self {
        let (state, _) = watch::channel(ProgressSnapshot::loading());
        Self { store, state }
    }

    #[must_use]
    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.state.subscribe()
    }

    /// Read every topic from the store (seeding if empty) and replace state.
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::Store` if the read fails; the snapshot then
    /// reports `LoadStatus::Failed`.
    pub async fn load(&self) -> Result<(), CoordinatorError> {
        self.state.send_modify(|s| s.status = LoadStatus::Loading);

        match self.store.read_all().await {
            Ok(topics) => {
                self.install(topics, None);
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load progress");
                let message = err.to_string();
                self.state.send_modify(|s| {
                    s.status = LoadStatus::Failed(message.clone());
                    s.notice = Some(Notice::error(format!("Could not load progress: {message}")));
                });
                Err(err.into())
            }
        }
    }

    /// Apply `patch` to the topic at `position` optimistically, then persist it.
    ///
    /// The in-memory entry is replaced before storage acknowledges. If the
    /// write fails and no newer update to that topic was issued meanwhile, the
    /// entry is rolled back; otherwise the topic is flagged unsynced until the
    /// next [`resync`](Self::resync).
    ///
    /// # Errors
    ///
    /// Returns `NotLoaded` before a successful load, `TopicNotFound` or
    /// `Topic` for bad addresses (state untouched), or `Store` if the write
    /// failed.
    pub async fn apply_update(
        &self,
        position: TopicPosition,
        patch: TopicPatch,
    ) -> Result<Arc<Topic>, CoordinatorError> {
        let mut staged = Err(CoordinatorError::NotLoaded);
        self.state.send_if_modified(|s| {
            staged = self.stage(s, position, patch);
            staged.is_ok()
        });
        let staged = staged?;
        let StagedWrite {
            ticket,
            previous,
            updated,
            epoch,
            revision,
        } = staged;

        match ticket.wait().await {
            Ok(()) => Ok(updated),
            Err(err) => {
                self.recover_failed_write(position, previous, epoch, revision, &err);
                Err(err.into())
            }
        }
    }

    /// Re-read everything from storage, discarding unsynced in-memory edits.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub async fn resync(&self) -> Result<(), CoordinatorError> {
        self.store.flush().await?;
        self.load().await
    }

    /// Delete all stored progress and reload the seed.
    ///
    /// Edits are rejected with `NotLoaded` while the reset runs. On failure
    /// the current state is left as it was.
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::Store` if the reset or the reload fails.
    pub async fn reset(&self) -> Result<(), CoordinatorError> {
        let previous = self.suspend_edits();
        if let Err(err) = self.store.reset_all().await {
            self.resume_edits(previous);
            self.publish_error(format!("Reset failed: {err}"));
            return Err(err.into());
        }

        self.state.send_modify(|s| {
            s.status = LoadStatus::Loading;
            s.topics = Arc::new(Vec::new());
            s.revisions.clear();
            s.unsynced.clear();
            s.epoch += 1;
        });
        self.load().await?;
        self.state
            .send_modify(|s| s.notice = Some(Notice::info("Progress reset")));
        Ok(())
    }

    /// Replace the in-memory dataset wholesale.
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::Validation` if `topics` is not a complete dataset.
    pub fn replace_all(&self, topics: Vec<Topic>) -> Result<(), CoordinatorError> {
        validate_topics(&topics)?;
        self.install(topics, None);
        Ok(())
    }

    /// Import `topics` into storage and adopt what was stored.
    ///
    /// Edits are rejected with `NotLoaded` until the import settles.
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::Store` (state untouched) if validation or
    /// persistence fails.
    pub async fn import(&self, topics: Vec<Topic>) -> Result<(), CoordinatorError> {
        let previous = self.suspend_edits();
        let stored = self.store.import_all(topics).await;
        self.finish_import(stored, previous)
    }

    /// Parse an export file, import it and adopt what was stored.
    ///
    /// # Errors
    ///
    /// Same as [`import`](Self::import).
    pub async fn import_json(&self, bytes: &[u8]) -> Result<(), CoordinatorError> {
        let previous = self.suspend_edits();
        let stored = self.store.import_json(bytes).await;
        self.finish_import(stored, previous)
    }

    fn finish_import(
        &self,
        stored: Result<Vec<Topic>, StoreError>,
        previous: LoadStatus,
    ) -> Result<(), CoordinatorError> {
        let checked = stored.and_then(|topics| {
            validate_topics(&topics)?;
            Ok(topics)
        });
        match checked {
            Ok(topics) => {
                self.install(topics, Some(Notice::info("Progress imported")));
                Ok(())
            }
            Err(err) => {
                self.resume_edits(previous);
                self.publish_error(format!("Import failed: {err}"));
                Err(err.into())
            }
        }
    }

    /// Close the snapshot to edits before a wholesale replace starts, so no
    /// update can be queued behind the replace's flush. Returns the status
    /// to put back if the replace fails.
    fn suspend_edits(&self) -> LoadStatus {
        let mut previous = LoadStatus::Loading;
        self.state.send_modify(|s| {
            previous = std::mem::replace(&mut s.status, LoadStatus::Loading);
        });
        previous
    }

    fn resume_edits(&self, previous: LoadStatus) {
        self.state.send_modify(|s| {
            if s.status == LoadStatus::Loading {
                s.status = previous;
            }
        });
    }

    fn stage(
        &self,
        s: &mut ProgressSnapshot,
        position: TopicPosition,
        patch: TopicPatch,
    ) -> Result<StagedWrite, CoordinatorError> {
        if !s.is_ready() {
            return Err(CoordinatorError::NotLoaded);
        }
        let index = position.index();
        let current = s
            .topics
            .get(index)
            .ok_or(CoordinatorError::TopicNotFound(position))?;
        let updated = Arc::new(current.apply_patch(&patch)?);
        let previous = Arc::clone(current);

        s.replace_topic(index, Arc::clone(&updated));
        s.revisions[index] += 1;
        s.notice = None;

        Ok(StagedWrite {
            ticket: self.store.enqueue_update(position, patch),
            previous,
            updated,
            epoch: s.epoch,
            revision: s.revisions[index],
        })
    }

    fn recover_failed_write(
        &self,
        position: TopicPosition,
        previous: Arc<Topic>,
        epoch: u64,
        revision: u64,
        err: &StoreError,
    ) {
        let index = position.index();
        self.state.send_modify(|s| {
            if s.epoch != epoch {
                return;
            }
            if s.revisions.get(index) == Some(&revision) {
                tracing::warn!(%position, error = %err, "rolling back failed update");
                s.replace_topic(index, previous);
            } else {
                tracing::warn!(%position, error = %err, "update failed behind newer edits; topic unsynced");
                s.unsynced.insert(position);
            }
            s.notice = Some(Notice::error(format!("Could not save progress: {err}")));
        });
    }

    fn install(&self, topics: Vec<Topic>, notice: Option<Notice>) {
        let revisions = vec![0; topics.len()];
        let topics = Arc::new(topics.into_iter().map(Arc::new).collect::<Vec<_>>());
        self.state.send_modify(|s| {
            s.status = LoadStatus::Ready;
            s.topics = topics;
            s.revisions = revisions;
            s.unsynced.clear();
            s.notice = notice;
            s.epoch += 1;
        });
    }

    fn publish_error(&self, message: String) {
        tracing::error!(%message, "progress operation failed");
        self.state
            .send_modify(|s| s.notice = Some(Notice::error(message)));
    }
}
