//! Command implementations. Renderers return strings; `main` prints them.

pub mod edit;
pub mod transfer;
pub mod view;

use anyhow::{Result, bail};
use services::{ProgressCoordinator, ProgressSnapshot};
use tracker_core::curriculum::{CURRICULUM, Route};
use tracker_core::model::{Topic, TopicPosition};

/// Where a topic argument points: a curriculum slug or a route path.
pub fn resolve_route(arg: &str) -> Result<Route> {
    let path = if arg.starts_with('/') {
        arg.to_owned()
    } else {
        format!("/{arg}")
    };
    match Route::resolve(&path) {
        Some(route) => Ok(route),
        None => {
            let slugs: Vec<&str> = CURRICULUM.iter().map(|c| c.slug).collect();
            bail!("unknown topic '{arg}'. Known topics: {}", slugs.join(", "))
        }
    }
}

pub fn resolve_topic(arg: &str) -> Result<TopicPosition> {
    match resolve_route(arg)? {
        Route::Topic(position) => Ok(position),
        Route::Home | Route::About => bail!("'{arg}' is not a topic"),
    }
}

/// Convert a 1-based question number into an index into `topic`.
pub fn question_index(topic: &Topic, number: usize) -> Result<usize> {
    let len = topic.questions().len();
    if number == 0 || number > len {
        bail!(
            "{} has questions 1-{len}; got {number}",
            topic.topic_name()
        );
    }
    Ok(number - 1)
}

/// Load progress and return the ready snapshot.
pub async fn loaded(coordinator: &ProgressCoordinator) -> Result<ProgressSnapshot> {
    coordinator.load().await?;
    Ok(coordinator.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::seed::default_topics;

    #[test]
    fn topics_resolve_by_slug_or_path() {
        assert_eq!(resolve_topic("graph").unwrap(), TopicPosition::new(11));
        assert_eq!(resolve_topic("/bst").unwrap(), TopicPosition::new(6));
        assert!(resolve_topic("about").is_err());
        let err = resolve_topic("queues").unwrap_err().to_string();
        assert!(err.contains("stacks_queues"));
    }

    #[test]
    fn question_numbers_are_one_based() {
        let topic = &default_topics().unwrap()[0];
        assert_eq!(question_index(topic, 1).unwrap(), 0);
        let last = topic.questions().len();
        assert_eq!(question_index(topic, last).unwrap(), last - 1);
        assert!(question_index(topic, 0).is_err());
        assert!(question_index(topic, last + 1).is_err());
    }
}
