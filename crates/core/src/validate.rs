//! Shape and content checks for user-supplied progress data.
//!
//! Imports arrive as untrusted JSON. Everything here is pure: a dataset is
//! either accepted as a whole or rejected with the first problem found.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::curriculum::TOPIC_COUNT;
use crate::model::{Question, Topic, TopicPosition};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("import is not valid JSON: {0}")]
    Malformed(String),

    #[error("import must be a JSON array of topics")]
    NotASequence,

    #[error("topic #{index} is malformed: {reason}")]
    MalformedTopic { index: usize, reason: String },

    #[error("topic #{topic} question #{question} is malformed: {reason}")]
    MalformedQuestion {
        topic: usize,
        question: usize,
        reason: String,
    },

    #[error("expected {expected} topics, found {found}")]
    TopicCount { expected: usize, found: usize },

    #[error("topic #{index} has position {found}; positions must match their order")]
    PositionMismatch { index: usize, found: TopicPosition },

    #[error("topic {position} has an empty name")]
    EmptyTopicName { position: TopicPosition },

    #[error("topic {position} question #{question} has an empty problem")]
    EmptyProblem {
        position: TopicPosition,
        question: usize,
    },

    #[error("topic {position} question #{question} has an invalid {field}: {value}")]
    InvalidUrl {
        position: TopicPosition,
        question: usize,
        field: &'static str,
        value: String,
    },
}

#[derive(Deserialize)]
struct RawTopic {
    #[serde(rename = "topicName")]
    topic_name: String,
    position: TopicPosition,
    questions: Vec<serde_json::Value>,
}

/// Parses and validates an exported progress file.
///
/// # Errors
///
/// Returns `ValidationError` if the bytes are not JSON, not an array, contain
/// a topic or question missing a required field, or fail [`validate_topics`].
pub fn parse_topics(bytes: &[u8]) -> Result<Vec<Topic>, ValidationError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    let serde_json::Value::Array(items) = value else {
        return Err(ValidationError::NotASequence);
    };

    let mut topics = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let raw: RawTopic =
            serde_json::from_value(item).map_err(|e| ValidationError::MalformedTopic {
                index,
                reason: e.to_string(),
            })?;

        let mut questions = Vec::with_capacity(raw.questions.len());
        for (question, q) in raw.questions.into_iter().enumerate() {
            let parsed: Question =
                serde_json::from_value(q).map_err(|e| ValidationError::MalformedQuestion {
                    topic: index,
                    question,
                    reason: e.to_string(),
                })?;
            questions.push(parsed);
        }

        topics.push(Topic::new(raw.topic_name, raw.position, questions));
    }

    validate_topics(&topics)?;
    Ok(topics)
}

/// Checks the dataset-level invariants: topic count, positional order,
/// non-empty names and problems, absolute URLs.
///
/// # Errors
///
/// Returns the first `ValidationError` encountered.
pub fn validate_topics(topics: &[Topic]) -> Result<(), ValidationError> {
    if topics.len() != TOPIC_COUNT {
        return Err(ValidationError::TopicCount {
            expected: TOPIC_COUNT,
            found: topics.len(),
        });
    }

    for (index, topic) in topics.iter().enumerate() {
        let position = topic.position();
        if position.index() != index {
            return Err(ValidationError::PositionMismatch {
                index,
                found: position,
            });
        }
        if topic.topic_name().trim().is_empty() {
            return Err(ValidationError::EmptyTopicName { position });
        }

        for (question, q) in topic.questions().iter().enumerate() {
            if q.problem().trim().is_empty() {
                return Err(ValidationError::EmptyProblem { position, question });
            }
            check_url(position, question, "URL", q.url())?;
            if let Some(url2) = q.url2().filter(|u| !u.trim().is_empty()) {
                check_url(position, question, "URL2", url2)?;
            }
        }
    }

    Ok(())
}

fn check_url(
    position: TopicPosition,
    question: usize,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    Url::parse(value).map(|_| ()).map_err(|_| ValidationError::InvalidUrl {
        position,
        question,
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::default_topics;

    fn seed_json() -> serde_json::Value {
        serde_json::to_value(default_topics().unwrap()).unwrap()
    }

    fn parse(value: &serde_json::Value) -> Result<Vec<Topic>, ValidationError> {
        parse_topics(value.to_string().as_bytes())
    }

    #[test]
    fn accepts_the_seed() {
        let topics = parse(&seed_json()).unwrap();
        assert_eq!(topics, default_topics().unwrap());
    }

    #[test]
    fn rejects_non_json_and_non_arrays() {
        assert!(matches!(
            parse_topics(b"not json"),
            Err(ValidationError::Malformed(_))
        ));
        assert_eq!(
            parse(&serde_json::json!({"topics": []})),
            Err(ValidationError::NotASequence)
        );
    }

    #[test]
    fn locates_missing_question_field() {
        let mut data = seed_json();
        data[4]["questions"][2]
            .as_object_mut()
            .unwrap()
            .remove("Bookmark");
        match parse(&data) {
            Err(ValidationError::MalformedQuestion {
                topic,
                question,
                reason,
            }) => {
                assert_eq!((topic, question), (4, 2));
                assert!(reason.contains("Bookmark"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_topic_name() {
        let mut data = seed_json();
        data[0].as_object_mut().unwrap().remove("topicName");
        assert!(matches!(
            parse(&data),
            Err(ValidationError::MalformedTopic { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_wrong_topic_count() {
        let mut data = seed_json();
        data.as_array_mut().unwrap().pop();
        assert_eq!(
            parse(&data),
            Err(ValidationError::TopicCount {
                expected: 15,
                found: 14
            })
        );
    }

    #[test]
    fn rejects_swapped_positions() {
        let mut data = seed_json();
        data.as_array_mut().unwrap().swap(0, 1);
        assert_eq!(
            parse(&data),
            Err(ValidationError::PositionMismatch {
                index: 0,
                found: TopicPosition::new(1)
            })
        );
    }

    #[test]
    fn rejects_relative_url() {
        let mut data = seed_json();
        data[2]["questions"][0]["URL"] = serde_json::json!("problems/reverse");
        assert!(matches!(
            parse(&data),
            Err(ValidationError::InvalidUrl { field: "URL", question: 0, .. })
        ));
    }

    #[test]
    fn tolerates_empty_url2_and_extra_fields() {
        let mut data = seed_json();
        data[3]["questions"][1]["URL2"] = serde_json::json!("");
        data[3]["started"] = serde_json::json!(true);
        let topics = parse(&data).unwrap();
        assert_eq!(topics[3].questions()[1].url2(), Some(""));
    }
}
