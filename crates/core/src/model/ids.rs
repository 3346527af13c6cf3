use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable position of a topic in the curriculum.
///
/// Doubles as the storage key and the route target, so it is assigned once in
/// the seed dataset and never recomputed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicPosition(u32);

impl TopicPosition {
    /// Creates a new `TopicPosition`
    #[must_use]
    pub fn new(position: u32) -> Self {
        Self(position)
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Returns the position as a slice index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Builds a position from a slice index, if it fits.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }
}

impl fmt::Debug for TopicPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopicPosition({})", self.0)
    }
}

impl fmt::Display for TopicPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&TopicPosition::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: TopicPosition = serde_json::from_str("14").unwrap();
        assert_eq!(back, TopicPosition::new(14));
    }

    #[test]
    fn index_round_trips() {
        let pos = TopicPosition::from_index(3).unwrap();
        assert_eq!(pos.index(), 3);
        assert_eq!(format!("{pos:?}"), "TopicPosition(3)");
    }
}
