//! # Graph Snapshot
//!
//! Read-only projection of a story for an external renderer: a flat
//! node list and an edge list. The engine has no opinion on layout,
//! color or shape; it only guarantees the projection is deterministic
//! and contains no dangling edges.

use crate::primitives::{LABEL_TEXT_LIMIT, UNTITLED_PLACEHOLDER};
use crate::{Choice, Node, NodeId, Story};
use serde::Serialize;

/// One renderable node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotNode {
    pub id: NodeId,
    /// Multi-line display label (title, truncated body, meta).
    pub label: String,
    pub is_start: bool,
}

/// One renderable edge. Only edges whose target exists are emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotEdge {
    pub source: NodeId,
    pub target: NodeId,
    /// Choice text plus the gate in brackets, if any.
    pub label: String,
}

/// The full render projection of a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<SnapshotNode>,
    pub edges: Vec<SnapshotEdge>,
}

impl GraphSnapshot {
    /// Project a story, in stored order.
    ///
    /// `show_gm` includes the GM-notes line in node labels.
    #[must_use]
    pub fn from_story(story: &Story, show_gm: bool) -> Self {
        let start = story.start_node_id.as_ref();
        let nodes = story
            .nodes
            .values()
            .map(|node| SnapshotNode {
                id: node.id.clone(),
                label: node_label(node, show_gm),
                is_start: Some(&node.id) == start,
            })
            .collect();
        let edges = story
            .nodes
            .values()
            .flat_map(|node| {
                node.choices
                    .iter()
                    .filter(|choice| story.contains_node(&choice.target_id))
                    .map(|choice| SnapshotEdge {
                        source: node.id.clone(),
                        target: choice.target_id.clone(),
                        label: edge_label(choice),
                    })
            })
            .collect();
        Self { nodes, edges }
    }
}

/// Display label for a node: title, flattened and truncated body, and
/// a compact meta line (`NPC: … @ … […]`), plus GM notes on request.
#[must_use]
pub fn node_label(node: &Node, show_gm: bool) -> String {
    let title = if node.title.is_empty() {
        UNTITLED_PLACEHOLDER
    } else {
        &node.title
    };
    let mut meta = Vec::new();
    if !node.npc.is_empty() {
        meta.push(format!("NPC: {}", node.npc));
    }
    if !node.location.is_empty() {
        meta.push(format!("@ {}", node.location));
    }
    if !node.emotion.is_empty() {
        meta.push(format!("[{}]", node.emotion));
    }
    let gm = if show_gm && !node.gm_notes.is_empty() {
        format!("\nGM: {}", node.gm_notes)
    } else {
        String::new()
    };
    let text = truncate_flat(&node.text, LABEL_TEXT_LIMIT);
    format!("{title}\n{text}\n{}{gm}", meta.join(" "))
}

/// Display label for an edge: choice text plus `[gate]`.
#[must_use]
pub fn edge_label(choice: &Choice) -> String {
    if choice.gate.is_empty() {
        choice.text.clone()
    } else {
        format!("{} [{}]", choice.text, choice.gate)
    }
}

/// Flatten newlines and cut at `limit` chars with an ellipsis.
fn truncate_flat(text: &str, limit: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= limit {
        return flat;
    }
    let cut: String = flat.chars().take(limit.saturating_sub(3)).collect();
    format!("{cut}\u{2026}")
}

// =============================================================================
// TESTS
// =============================================================================
