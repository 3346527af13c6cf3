//! The fixed curriculum: 15 categories, their display names and route slugs.
//!
//! Positions here are the same positions used as storage keys, so this table
//! must never be reordered.

use crate::model::TopicPosition;

/// One curriculum category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub slug: &'static str,
}

pub const CURRICULUM: [Category; 15] = [
    Category { name: "Array", slug: "array" },
    Category { name: "Matrix", slug: "matrix" },
    Category { name: "String", slug: "string" },
    Category { name: "Searching & Sorting", slug: "search_sort" },
    Category { name: "LinkedList", slug: "linked_list" },
    Category { name: "Binary Trees", slug: "binary_trees" },
    Category { name: "Binary Search Trees", slug: "bst" },
    Category { name: "Greedy", slug: "greedy" },
    Category { name: "BackTracking", slug: "backtracking" },
    Category { name: "Stacks & Queues", slug: "stacks_queues" },
    Category { name: "Heap", slug: "heap" },
    Category { name: "Graph", slug: "graph" },
    Category { name: "Trie", slug: "trie" },
    Category { name: "Dynamic Programming", slug: "dynamic_programming" },
    Category { name: "Bit Manipulation", slug: "bit_manipulation" },
];

/// Number of topics every well-formed dataset holds.
pub const TOPIC_COUNT: usize = CURRICULUM.len();

#[must_use]
pub fn category(position: TopicPosition) -> Option<&'static Category> {
    CURRICULUM.get(position.index())
}

/// Looks up a topic position by its route slug (leading `/` optional).
#[must_use]
pub fn position_for_slug(slug: &str) -> Option<TopicPosition> {
    let slug = slug.trim_start_matches('/');
    CURRICULUM
        .iter()
        .position(|c| c.slug == slug)
        .and_then(TopicPosition::from_index)
}

/// Resolved navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    About,
    Topic(TopicPosition),
}

impl Route {
    /// Resolves a path such as `/`, `/about` or `/graph`.
    #[must_use]
    pub fn resolve(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" => Some(Self::Home),
            "/about" => Some(Self::About),
            other if other.starts_with('/') => position_for_slug(other).map(Self::Topic),
            _ => None,
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::About => "/about".to_string(),
            Route::Topic(position) => match category(*position) {
                Some(c) => format!("/{}", c.slug),
                None => "/".to_string(),
            },
        }
    }
}
