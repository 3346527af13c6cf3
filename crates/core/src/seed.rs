//! The default dataset written to an empty store.

use thiserror::Error;

use crate::model::Topic;
use crate::validate::{ValidationError, validate_topics};

const SEED_JSON: &str = include_str!("../data/seed.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error("seed dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("seed dataset is inconsistent: {0}")]
    Invalid(#[from] ValidationError),
}

/// Returns the deterministic seed: every curriculum topic with all questions
/// untouched.
///
/// # Errors
///
/// Returns `SeedError` if the embedded dataset fails to parse or validate.
pub fn default_topics() -> Result<Vec<Topic>, SeedError> {
    let topics: Vec<Topic> = serde_json::from_str(SEED_JSON)?;
    validate_topics(&topics)?;
    Ok(topics)
}
