//! Read-only views: topic list, a single topic, bookmarks.

use anyhow::{Result, bail};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use services::ProgressSnapshot;
use tracker_core::curriculum::category;
use tracker_core::model::{Topic, TopicPosition};

pub const ABOUT: &str = "Track your progress through 15 data structures and algorithms topics. \
Mark questions done, bookmark the ones to revisit and keep notes. Everything is stored locally.";

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    // keep rendering independent of the terminal running the tests
    #[cfg(test)]
    table.force_no_tty();
    table
}

fn check(flag: bool) -> &'static str {
    if flag { "x" } else { "" }
}

/// One row per topic with its progress, followed by the overall total.
pub fn topic_list(snapshot: &ProgressSnapshot) -> String {
    let mut table = table();
    table.set_header(vec!["#", "Topic", "Slug", "Done", "Bookmarked", "Progress"]);
    for topic in snapshot.topics() {
        let progress = topic.progress();
        let slug = category(topic.position()).map_or("-", |c| c.slug);
        table.add_row(vec![
            Cell::new(topic.position().value() + 1),
            Cell::new(topic.topic_name()),
            Cell::new(slug),
            Cell::new(format!("{}/{}", progress.done, progress.total)),
            Cell::new(progress.bookmarked),
            Cell::new(format!("{}%", progress.percent())).set_alignment(CellAlignment::Right),
        ]);
    }

    let overall = snapshot.progress();
    format!(
        "{table}\nOverall: {}/{} done ({}%), {} bookmarked",
        overall.done,
        overall.total,
        overall.percent(),
        overall.bookmarked
    )
}

pub fn topic_detail(topic: &Topic) -> String {
    let progress = topic.progress();
    let mut table = table();
    table.set_header(vec!["#", "Problem", "Done", "Bookmark", "Notes", "Link"]);
    for (i, q) in topic.questions().iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            q.problem().to_owned(),
            check(q.done()).to_owned(),
            check(q.bookmark()).to_owned(),
            q.notes().unwrap_or_default().to_owned(),
            q.url().to_owned(),
        ]);
    }
    format!(
        "{} ({}/{} done)\n{table}",
        topic.topic_name(),
        progress.done,
        progress.total
    )
}

/// Detail view of the topic at `position` in `snapshot`.
pub fn show_topic(snapshot: &ProgressSnapshot, position: TopicPosition) -> Result<String> {
    match snapshot.topic(position) {
        Some(topic) => Ok(topic_detail(topic)),
        None => bail!("topic {position} is not loaded"),
    }
}

/// Every bookmarked question across all topics, in curriculum order.
pub fn bookmarks(snapshot: &ProgressSnapshot) -> String {
    let mut table = table();
    table.set_header(vec!["Topic", "#", "Problem", "Done", "Link"]);
    let mut count = 0;
    for topic in snapshot.topics() {
        for (i, q) in topic.bookmarked() {
            count += 1;
            table.add_row(vec![
                topic.topic_name().to_owned(),
                (i + 1).to_string(),
                q.problem().to_owned(),
                check(q.done()).to_owned(),
                q.url().to_owned(),
            ]);
        }
    }
    if count == 0 {
        return "No bookmarked questions.".to_owned();
    }
    table.to_string()
}
