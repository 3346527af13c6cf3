use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Question, TopicPatch, TopicPosition};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("question {index} does not exist in topic {position} ({len} questions)")]
    QuestionOutOfRange {
        position: TopicPosition,
        index: usize,
        len: usize,
    },
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

/// A curriculum category and its ordered questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(rename = "topicName")]
    topic_name: String,
    position: TopicPosition,
    questions: Vec<Question>,
}

impl Topic {
    #[must_use]
    pub fn new(
        topic_name: impl Into<String>,
        position: TopicPosition,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            topic_name: topic_name.into(),
            position,
            questions,
        }
    }

    #[must_use]
    pub fn topic_name(&self) -> &str {
        &self.topic_name
    }

    #[must_use]
    pub fn position(&self) -> TopicPosition {
        self.position
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns a new topic with `patch` merged over this one.
    ///
    /// Question count and order are preserved; only the patched fields of the
    /// addressed questions change.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::QuestionOutOfRange` if any edit addresses a
    /// question index past the end of the list. Nothing is applied in that case.
    pub fn apply_patch(&self, patch: &TopicPatch) -> Result<Topic, TopicError> {
        let len = self.questions.len();
        if let Some((index, _)) = patch.edits().iter().find(|(index, _)| *index >= len) {
            return Err(TopicError::QuestionOutOfRange {
                position: self.position,
                index: *index,
                len,
            });
        }

        let mut questions = self.questions.clone();
        for (index, edit) in patch.edits() {
            questions[*index] = edit.merge_into(&questions[*index]);
        }

        Ok(Topic {
            topic_name: self.topic_name.clone(),
            position: self.position,
            questions,
        })
    }

    #[must_use]
    pub fn progress(&self) -> TopicProgress {
        TopicProgress {
            done: self.questions.iter().filter(|q| q.done()).count(),
            bookmarked: self.questions.iter().filter(|q| q.bookmark()).count(),
            total: self.questions.len(),
        }
    }

    /// Bookmarked questions with their 0-based index.
    pub fn bookmarked(&self) -> impl Iterator<Item = (usize, &Question)> {
        self.questions
            .iter()
            .enumerate()
            .filter(|(_, q)| q.bookmark())
    }
}

/// Completion counters for one topic (or the whole curriculum when summed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicProgress {
    pub done: usize,
    pub bookmarked: usize,
    pub total: usize,
}

impl TopicProgress {
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.done > 0
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.done == self.total
    }

    /// Whole-number percentage, rounded down.
    #[must_use]
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.done * 100 / self.total
        }
    }
}

impl std::ops::Add for TopicProgress {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            done: self.done + rhs.done,
            bookmarked: self.bookmarked + rhs.bookmarked,
            total: self.total + rhs.total,
        }
    }
}

impl std::iter::Sum for TopicProgress {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, p| acc + p)
    }
}
