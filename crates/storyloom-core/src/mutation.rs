//! # Mutation Engine
//!
//! Consolidates all story mutation operations.
//!
//! All mutations are:
//! - Deterministic (tie-breaks use stored ascending-id order)
//! - All-or-nothing at single-operation granularity: a failed call
//!   leaves the story untouched
//! - Referentially safe: deleting a node removes every inbound choice
//!   pointing at it, so the graph never silently keeps a stale edge

use crate::primitives::{COPY_SUFFIX, UNTITLED_PLACEHOLDER};
use crate::{Choice, Node, NodeId, Story, StoryError};
use std::collections::BTreeSet;

// =============================================================================
// DRAFTS & AUXILIARY TYPES
// =============================================================================

/// Field bundle for creating a node.
///
/// Every field is optional in spirit: empty strings and empty tag
/// lists are the defaults. Strings are trimmed on creation and a blank
/// title is replaced with the placeholder.
#[derive(Debug, Clone, Default)]
pub struct NodeDraft {
    pub title: String,
    pub text: String,
    pub npc: String,
    pub location: String,
    pub emotion: String,
    pub tags: Vec<String>,
    pub gm_notes: String,
}

impl NodeDraft {
    /// Draft with just a title and body text.
    #[must_use]
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Direction for [`MutationEngine::move_choice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Swap with the previous choice.
    Up,
    /// Swap with the next choice.
    Down,
}

/// Wiring state of a single choice, relative to a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceStatus {
    /// Target exists in the story.
    Wired,
    /// Empty target: intentionally left open while drafting.
    Unwired,
    /// Non-empty target that no longer resolves to a node.
    Dangling,
}

// =============================================================================
// MUTATION ENGINE
// =============================================================================

/// The MutationEngine consolidates all story mutation operations.
///
/// Operations referencing a missing node fail fast with
/// [`StoryError::NotFound`], except [`MutationEngine::delete_node`],
/// whose no-op on a missing id is an intentional idempotence
/// guarantee.
pub struct MutationEngine;

impl MutationEngine {
    /// Create a node from a draft and insert it into the story.
    ///
    /// Trims every string field; a blank title becomes
    /// `"(untitled)"`; tags are trimmed with empties discarded. The
    /// new node has no choices. The first node ever created becomes
    /// the start node.
    pub fn create_node(story: &mut Story, draft: NodeDraft) -> NodeId {
        let id = NodeId::generate();
        let title = draft.title.trim();
        let node = Node {
            id: id.clone(),
            title: if title.is_empty() {
                UNTITLED_PLACEHOLDER.to_string()
            } else {
                title.to_string()
            },
            text: draft.text.trim().to_string(),
            npc: draft.npc.trim().to_string(),
            location: draft.location.trim().to_string(),
            emotion: draft.emotion.trim().to_string(),
            tags: normalize_tags(draft.tags),
            gm_notes: draft.gm_notes.trim().to_string(),
            choices: Vec::new(),
        };
        story.nodes.insert(id.clone(), node);
        if story.start_node_id.is_none() {
            story.start_node_id = Some(id.clone());
        }
        id
    }

    /// Duplicate a node, including its full choice list.
    ///
    /// The copy gets a fresh id and a `" (copy)"` title suffix;
    /// duplicated choices point at the *same* targets as the
    /// original. The start node is unchanged.
    pub fn duplicate_node(story: &mut Story, source_id: &NodeId) -> Result<NodeId, StoryError> {
        let source = story
            .node(source_id)
            .ok_or_else(|| StoryError::NotFound(source_id.clone()))?;

        let id = NodeId::generate();
        let copy = Node {
            id: id.clone(),
            title: format!("{}{}", source.title, COPY_SUFFIX),
            text: source.text.clone(),
            npc: source.npc.clone(),
            location: source.location.clone(),
            emotion: source.emotion.clone(),
            tags: source.tags.clone(),
            gm_notes: source.gm_notes.clone(),
            choices: source.choices.clone(),
        };
        story.nodes.insert(id.clone(), copy);
        Ok(id)
    }

    /// Delete a node and every choice elsewhere that targets it.
    ///
    /// A missing id is a no-op, not an error: deleting twice is safe.
    /// If the deleted node was the start node, the first remaining
    /// node in stored order becomes the start (`None` if the story is
    /// now empty).
    pub fn delete_node(story: &mut Story, node_id: &NodeId) {
        if !story.contains_node(node_id) {
            return;
        }
        for node in story.nodes.values_mut() {
            node.choices.retain(|choice| choice.target_id != *node_id);
        }
        story.nodes.remove(node_id);
        if story.start_node_id.as_ref() == Some(node_id) {
            story.start_node_id = story.first_node_id().cloned();
        }
    }

    /// Designate a node as the start node.
    pub fn set_start(story: &mut Story, node_id: &NodeId) -> Result<(), StoryError> {
        if !story.contains_node(node_id) {
            return Err(StoryError::NotFound(node_id.clone()));
        }
        story.start_node_id = Some(node_id.clone());
        Ok(())
    }

    // =========================================================================
    // CHOICE EDITS
    // =========================================================================

    /// Append a choice to a node's choice list.
    pub fn add_choice(
        story: &mut Story,
        node_id: &NodeId,
        choice: Choice,
    ) -> Result<(), StoryError> {
        let node = story
            .node_mut(node_id)
            .ok_or_else(|| StoryError::NotFound(node_id.clone()))?;
        node.choices.push(choice);
        Ok(())
    }

    /// Replace the choice at `index`.
    pub fn edit_choice(
        story: &mut Story,
        node_id: &NodeId,
        index: usize,
        choice: Choice,
    ) -> Result<(), StoryError> {
        let node = story
            .node_mut(node_id)
            .ok_or_else(|| StoryError::NotFound(node_id.clone()))?;
        let len = node.choices.len();
        let slot = node
            .choices
            .get_mut(index)
            .ok_or(StoryError::IndexOutOfRange { index, len })?;
        *slot = choice;
        Ok(())
    }

    /// Remove and return the choice at `index`.
    pub fn remove_choice(
        story: &mut Story,
        node_id: &NodeId,
        index: usize,
    ) -> Result<Choice, StoryError> {
        let node = story
            .node_mut(node_id)
            .ok_or_else(|| StoryError::NotFound(node_id.clone()))?;
        let len = node.choices.len();
        if index >= len {
            return Err(StoryError::IndexOutOfRange { index, len });
        }
        Ok(node.choices.remove(index))
    }

    /// Swap the choice at `index` with its neighbor.
    ///
    /// A position past either end of the list is a silent no-op;
    /// reordering never wraps and never fails on bounds. A missing
    /// node is still `NotFound`.
    pub fn move_choice(
        story: &mut Story,
        node_id: &NodeId,
        index: usize,
        direction: MoveDirection,
    ) -> Result<(), StoryError> {
        let node = story
            .node_mut(node_id)
            .ok_or_else(|| StoryError::NotFound(node_id.clone()))?;
        let len = node.choices.len();
        match direction {
            MoveDirection::Up => {
                if index > 0 && index < len {
                    node.choices.swap(index - 1, index);
                }
            }
            MoveDirection::Down => {
                if len > 0 && index < len - 1 {
                    node.choices.swap(index, index + 1);
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // UNWIRED / DANGLING DETECTION (read-only)
    // =========================================================================

    /// Wiring state of one choice relative to the story.
    #[must_use]
    pub fn choice_status(story: &Story, choice: &Choice) -> ChoiceStatus {
        if choice.is_unwired() {
            ChoiceStatus::Unwired
        } else if story.contains_node(&choice.target_id) {
            ChoiceStatus::Wired
        } else {
            ChoiceStatus::Dangling
        }
    }

    /// Whether any choice on the node is unwired or dangling.
    ///
    /// Callers use this to warn; the engine never auto-repairs a
    /// choice outside the `delete_node` inbound-reference rule.
    pub fn has_unresolved_choices(story: &Story, node_id: &NodeId) -> Result<bool, StoryError> {
        Ok(!Self::unresolved_choices(story, node_id)?.is_empty())
    }

    /// Indices and statuses of every non-wired choice on the node.
    pub fn unresolved_choices(
        story: &Story,
        node_id: &NodeId,
    ) -> Result<Vec<(usize, ChoiceStatus)>, StoryError> {
        let node = story
            .node(node_id)
            .ok_or_else(|| StoryError::NotFound(node_id.clone()))?;
        Ok(node
            .choices
            .iter()
            .enumerate()
            .map(|(i, c)| (i, Self::choice_status(story, c)))
            .filter(|(_, status)| *status != ChoiceStatus::Wired)
            .collect())
    }
}

/// Trim tags and drop empties, collapsing duplicates into a set.
fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
