//! Partial updates to a topic's question list.
//!
//! Merge is shallow: a field present in a [`QuestionPatch`] overwrites the
//! stored value, absent fields are left alone. Applying the same patch twice
//! yields the same result as applying it once.

use crate::model::Question;

/// Field-level change to one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionPatch {
    pub done: Option<bool>,
    pub bookmark: Option<bool>,
    /// `Some(None)` clears the notes, `Some(Some(_))` sets them.
    pub notes: Option<Option<String>>,
}

impl QuestionPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }

    #[must_use]
    pub fn bookmark(mut self, bookmark: bool) -> Self {
        self.bookmark = Some(bookmark);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(Some(notes.into()));
        self
    }

    #[must_use]
    pub fn clear_notes(mut self) -> Self {
        self.notes = Some(None);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.done.is_none() && self.bookmark.is_none() && self.notes.is_none()
    }

    /// Returns a copy of `question` with the patched fields overwritten.
    #[must_use]
    pub fn merge_into(&self, question: &Question) -> Question {
        let mut merged = question.clone();
        if let Some(done) = self.done {
            merged = merged.with_done(done);
        }
        if let Some(bookmark) = self.bookmark {
            merged = merged.with_bookmark(bookmark);
        }
        if let Some(notes) = &self.notes {
            merged = merged.with_notes(notes.clone());
        }
        merged
    }
}

/// Ordered set of question edits addressed by index within one topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicPatch {
    edits: Vec<(usize, QuestionPatch)>,
}

impl TopicPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for the common single-question edit.
    #[must_use]
    pub fn single(index: usize, patch: QuestionPatch) -> Self {
        Self::new().question(index, patch)
    }

    #[must_use]
    pub fn question(mut self, index: usize, patch: QuestionPatch) -> Self {
        self.edits.push((index, patch));
        self
    }

    #[must_use]
    pub fn edits(&self) -> &[(usize, QuestionPatch)] {
        &self.edits
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.iter().all(|(_, patch)| patch.is_empty())
    }
}
