//! # Query Module
//!
//! Read-only projections over a story, beside the mutation engine:
//! world-state summaries and text search. Nothing here mutates.

use crate::{Node, Story};
use serde::Serialize;
use std::collections::BTreeSet;

/// Sorted, deduplicated world-state rollup of a story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorldSummary {
    pub npcs: Vec<String>,
    pub locations: Vec<String>,
    pub tags: Vec<String>,
}

/// Collect every NPC, location and tag in use, sorted and unique.
/// Empty values are excluded.
#[must_use]
pub fn world_summary(story: &Story) -> WorldSummary {
    let mut npcs = BTreeSet::new();
    let mut locations = BTreeSet::new();
    let mut tags = BTreeSet::new();
    for node in story.nodes.values() {
        if !node.npc.is_empty() {
            npcs.insert(node.npc.clone());
        }
        if !node.location.is_empty() {
            locations.insert(node.location.clone());
        }
        tags.extend(node.tags.iter().cloned());
    }
    WorldSummary {
        npcs: npcs.into_iter().collect(),
        locations: locations.into_iter().collect(),
        tags: tags.into_iter().collect(),
    }
}

/// Case-insensitive substring search over node titles and body text.
///
/// An empty (or all-whitespace) query matches every node. Results are
/// in stored order.
#[must_use]
pub fn search_nodes<'a>(story: &'a Story, query: &str) -> Vec<&'a Node> {
    let needle = query.trim().to_lowercase();
    story
        .nodes
        .values()
        .filter(|node| {
            needle.is_empty()
                || node.title.to_lowercase().contains(&needle)
                || node.text.to_lowercase().contains(&needle)
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
