//! Progress report and JSON export.
//!
//! The report is a title followed by one section per topic: a heading and a
//! table with one row per question, in stored order.

use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use tracker_core::Clock;
use tracker_core::model::{Question, Topic, TopicProgress};

use crate::error::ExportError;

pub const REPORT_TITLE: &str = "Progress Report";
pub const REPORT_COLUMNS: [&str; 7] = [
    "Question", "Problem", "Done", "Bookmark", "Notes", "URL", "URL2",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub number: usize,
    pub problem: String,
    pub done: bool,
    pub bookmark: bool,
    pub notes: Option<String>,
    pub url: String,
    pub url2: Option<String>,
}

impl ReportRow {
    fn from_question(number: usize, q: &Question) -> Self {
        Self {
            number,
            problem: q.problem().to_owned(),
            done: q.done(),
            bookmark: q.bookmark(),
            notes: q.notes().filter(|n| !n.is_empty()).map(str::to_owned),
            url: q.url().to_owned(),
            url2: q.url2().map(str::to_owned),
        }
    }

    /// Cell texts in [`REPORT_COLUMNS`] order.
    #[must_use]
    pub fn cells(&self) -> [String; 7] {
        [
            self.number.to_string(),
            self.problem.clone(),
            yes_no(self.done).to_owned(),
            yes_no(self.bookmark).to_owned(),
            self.notes.clone().unwrap_or_else(|| "None".to_owned()),
            self.url.clone(),
            self.url2.clone().unwrap_or_default(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub heading: String,
    pub progress: TopicProgress,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
}

impl ProgressReport {
    /// Build a report covering every question of every topic.
    #[must_use]
    pub fn build(topics: &[Topic], clock: &Clock) -> Self {
        let sections = topics
            .iter()
            .map(|topic| ReportSection {
                heading: topic.topic_name().to_owned(),
                progress: topic.progress(),
                rows: topic
                    .questions()
                    .iter()
                    .enumerate()
                    .map(|(i, q)| ReportRow::from_question(i + 1, q))
                    .collect(),
            })
            .collect();

        Self {
            title: REPORT_TITLE.to_owned(),
            generated_at: clock.now(),
            sections,
        }
    }

    /// Render the report as plain text tables.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "{}\nGenerated {}\n",
            self.title,
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        );

        for section in &self.sections {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_width(160)
                .set_header(
                    REPORT_COLUMNS
                        .iter()
                        .map(|c| Cell::new(c).add_attribute(Attribute::Bold)),
                );
            for row in &section.rows {
                table.add_row(row.cells());
            }

            out.push_str(&format!(
                "\n{} ({}/{} done)\n{table}\n",
                section.heading, section.progress.done, section.progress.total
            ));
        }
        out
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// Serialize topics in the import format.
///
/// # Errors
///
/// Returns `ExportError::Empty` for an empty dataset, or `ExportError::Json`
/// if serialization fails.
pub fn to_json(topics: &[Topic]) -> Result<String, ExportError> {
    if topics.is_empty() {
        return Err(ExportError::Empty);
    }
    Ok(serde_json::to_string_pretty(topics)?)
}
