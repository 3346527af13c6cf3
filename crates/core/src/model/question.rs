use serde::{Deserialize, Serialize};

/// A single practice problem and the user's progress on it.
///
/// Field names on the wire follow the persisted document layout
/// (`Problem`, `Done`, `Bookmark`, `Notes`, `URL`, `URL2`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "Problem")]
    problem: String,
    #[serde(rename = "Done")]
    done: bool,
    #[serde(rename = "Bookmark")]
    bookmark: bool,
    #[serde(rename = "Notes", default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(rename = "URL")]
    url: String,
    #[serde(rename = "URL2", default, skip_serializing_if = "Option::is_none")]
    url2: Option<String>,
}

impl Question {
    /// Creates an untouched question (not done, not bookmarked, no notes).
    #[must_use]
    pub fn new(problem: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            done: false,
            bookmark: false,
            notes: None,
            url: url.into(),
            url2: None,
        }
    }

    #[must_use]
    pub fn with_url2(mut self, url2: impl Into<String>) -> Self {
        self.url2 = Some(url2.into());
        self
    }

    #[must_use]
    pub fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }

    #[must_use]
    pub fn with_bookmark(mut self, bookmark: bool) -> Self {
        self.bookmark = bookmark;
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    #[must_use]
    pub fn problem(&self) -> &str {
        &self.problem
    }

    #[must_use]
    pub fn done(&self) -> bool {
        self.done
    }

    #[must_use]
    pub fn bookmark(&self) -> bool {
        self.bookmark
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn url2(&self) -> Option<&str> {
        self.url2.as_deref()
    }
}
