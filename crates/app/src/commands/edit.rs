//! Single-question edits: done, bookmark, notes.

use anyhow::{Result, bail};
use services::ProgressCoordinator;
use tracker_core::model::{QuestionPatch, TopicPatch, TopicPosition};

use super::{loaded, question_index};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Done(bool),
    Bookmark(bool),
    /// `None` clears the note.
    Note(Option<String>),
}

impl Edit {
    pub fn patch(&self) -> QuestionPatch {
        match self {
            Edit::Done(flag) => QuestionPatch::new().done(*flag),
            Edit::Bookmark(flag) => QuestionPatch::new().bookmark(*flag),
            Edit::Note(Some(text)) => QuestionPatch::new().notes(text.clone()),
            Edit::Note(None) => QuestionPatch::new().clear_notes(),
        }
    }

    /// Build a note edit from the `note` command's arguments.
    pub fn note(text: Option<String>, clear: bool) -> Result<Self> {
        match (text, clear) {
            (Some(_), true) => bail!("give either a note or --clear, not both"),
            (None, false) => bail!("give a note text or --clear"),
            (Some(text), false) if text.trim().is_empty() => Ok(Edit::Note(None)),
            (text, _) => Ok(Edit::Note(text)),
        }
    }
}

/// Apply `edit` to question `number` (1-based) of the topic at `position`
/// and wait until it is stored. Returns a one-line confirmation.
pub async fn execute(
    coordinator: &ProgressCoordinator,
    position: TopicPosition,
    number: usize,
    edit: Edit,
) -> Result<String> {
    let snapshot = loaded(coordinator).await?;
    let Some(topic) = snapshot.topic(position) else {
        bail!("topic {position} is not loaded");
    };
    let index = question_index(topic, number)?;

    let updated = coordinator
        .apply_update(position, TopicPatch::single(index, edit.patch()))
        .await?;
    let question = &updated.questions()[index];
    tracing::debug!(%position, index, ?edit, "question updated");

    let what = match edit {
        Edit::Done(true) => "marked done",
        Edit::Done(false) => "marked not done",
        Edit::Bookmark(true) => "bookmarked",
        Edit::Bookmark(false) => "removed from bookmarks",
        Edit::Note(Some(_)) => "note saved",
        Edit::Note(None) => "note cleared",
    };
    Ok(format!(
        "{} #{number} \"{}\": {what}",
        updated.topic_name(),
        question.problem()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::{Clock, StoreConfig, TrackerServices};

    #[test]
    fn note_arguments() {
        assert_eq!(
            Edit::note(Some("dp".into()), false).unwrap(),
            Edit::Note(Some("dp".into()))
        );
        assert_eq!(Edit::note(None, true).unwrap(), Edit::Note(None));
        assert_eq!(Edit::note(Some("  ".into()), false).unwrap(), Edit::Note(None));
        assert!(Edit::note(None, false).is_err());
        assert!(Edit::note(Some("x".into()), true).is_err());
    }

    #[tokio::test]
    async fn edits_are_persisted() {
        let services = TrackerServices::in_memory(StoreConfig::default(), Clock::system());
        let coordinator = services.coordinator();
        let position = TopicPosition::new(13);

        let msg = execute(&coordinator, position, 2, Edit::Done(true)).await.unwrap();
        assert!(msg.starts_with("Dynamic Programming #2"));
        assert!(msg.ends_with("marked done"));
        execute(&coordinator, position, 2, Edit::Note(Some("tabulation".into())))
            .await
            .unwrap();

        let stored = services.store().export_all().await.unwrap();
        let question = &stored[13].questions()[1];
        assert!(question.done());
        assert_eq!(question.notes(), Some("tabulation"));
    }

    #[tokio::test]
    async fn out_of_range_number_is_rejected() {
        let services = TrackerServices::in_memory(StoreConfig::default(), Clock::system());
        let coordinator = services.coordinator();
        let err = execute(&coordinator, TopicPosition::new(0), 99, Edit::Bookmark(true))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("got 99"));
    }
}
