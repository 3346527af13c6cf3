use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracker_core::model::{Topic, TopicPosition};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn position_to_i64(position: TopicPosition) -> i64 {
    i64::from(position.value())
}

fn position_from_i64(v: i64) -> Result<TopicPosition, StorageError> {
    u32::try_from(v)
        .map(TopicPosition::new)
        .map_err(|_| StorageError::Serialization(format!("position out of range: {v}")))
}

pub(crate) fn topic_to_document(topic: &Topic) -> Result<String, StorageError> {
    serde_json::to_string(topic).map_err(ser)
}

/// Decode a stored document and check it sits under its own key.
pub(crate) fn map_topic_row(row: &SqliteRow) -> Result<Topic, StorageError> {
    let position = position_from_i64(row.try_get::<i64, _>("position").map_err(ser)?)?;
    let document: String = row.try_get("document").map_err(ser)?;
    let topic: Topic = serde_json::from_str(&document).map_err(ser)?;

    if topic.position() != position {
        return Err(StorageError::Serialization(format!(
            "document at position {position} claims position {}",
            topic.position()
        )));
    }
    Ok(topic)
}
