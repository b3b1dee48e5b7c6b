//! # Playback Module
//!
//! The rehearsal state machine: a cursor over the story graph with a
//! branchable visit history.
//!
//! Playback state is session-local and volatile: it is never
//! serialized with the story and holds no ownership of nodes, only
//! ids. The story itself is passed into every transition, so several
//! independent playbacks can rehearse the same story.
//!
//! There is no distinct "finished" state: a node without choices is
//! terminal in the caller's eyes only. A current id that no longer
//! resolves (after choosing an unwired or dangling choice, or after a
//! concurrent edit) is the explicit *current node missing* condition,
//! observable through [`Playback::current_node`], never a crash.

use crate::{Node, NodeId, Story, StoryError};

/// A rehearsal cursor: the current node id plus the visited history.
///
/// Invariant: `history` is non-empty and its last entry equals
/// `current`. Every constructor and transition maintains this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    current: NodeId,
    history: Vec<NodeId>,
}

impl Playback {
    /// Begin playback at the given node.
    pub fn start(story: &Story, node_id: &NodeId) -> Result<Self, StoryError> {
        if !story.contains_node(node_id) {
            return Err(StoryError::NotFound(node_id.clone()));
        }
        Ok(Self {
            current: node_id.clone(),
            history: vec![node_id.clone()],
        })
    }

    /// Begin playback at the story's start node, falling back to the
    /// first stored node (repairing `start_node_id` on the way) when
    /// the start id is absent or dangling. `None` on an empty story.
    pub fn start_default(story: &mut Story) -> Option<Self> {
        story.repair_start();
        let id = story.start_node_id.clone()?;
        Some(Self {
            current: id.clone(),
            history: vec![id],
        })
    }

    /// Reset history and position to the given node.
    pub fn restart(&mut self, story: &Story, node_id: &NodeId) -> Result<(), StoryError> {
        *self = Self::start(story, node_id)?;
        Ok(())
    }

    /// The current node id (which may no longer resolve).
    #[must_use]
    pub fn current_id(&self) -> &NodeId {
        &self.current
    }

    /// Visited node ids, oldest first; the last entry is current.
    #[must_use]
    pub fn history(&self) -> &[NodeId] {
        &self.history
    }

    /// Number of visited beats, including the current one.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Resolve the current node against the story.
    ///
    /// `None` is the *current node missing* condition; callers surface
    /// it as a warning rather than advancing narrative content.
    #[must_use]
    pub fn current_node<'a>(&self, story: &'a Story) -> Option<&'a Node> {
        story.node(&self.current)
    }

    /// Whether the current id fails to resolve against the story.
    #[must_use]
    pub fn is_current_missing(&self, story: &Story) -> bool {
        !story.contains_node(&self.current)
    }

    /// Follow the current node's choice at `index`.
    ///
    /// Appends the choice's target to history and moves there, even
    /// when the target is unwired or dangling, in which case the
    /// playback lands in the current-node-missing condition. A missing
    /// current node has an empty choice list, so every index is out of
    /// range there.
    pub fn choose(&mut self, story: &Story, index: usize) -> Result<&NodeId, StoryError> {
        let choices = self
            .current_node(story)
            .map(|node| node.choices.as_slice())
            .unwrap_or_default();
        let len = choices.len();
        let choice = choices
            .get(index)
            .ok_or(StoryError::IndexOutOfRange { index, len })?;
        self.current = choice.target_id.clone();
        self.history.push(self.current.clone());
        Ok(&self.current)
    }

    /// Step back one beat.
    ///
    /// A history of length one is the starting point; stepping back
    /// there is a no-op, not an error.
    pub fn step_back(&mut self) -> &NodeId {
        if self.history.len() > 1 {
            self.history.pop();
            if let Some(last) = self.history.last() {
                self.current = last.clone();
            }
        }
        &self.current
    }

    /// Rewind to an earlier beat to branch differently.
    ///
    /// Truncates history to `0..=index` and moves there.
    pub fn jump_to(&mut self, index: usize) -> Result<&NodeId, StoryError> {
        let len = self.history.len();
        if index >= len {
            return Err(StoryError::IndexOutOfRange { index, len });
        }
        self.history.truncate(index + 1);
        if let Some(last) = self.history.last() {
            self.current = last.clone();
        }
        Ok(&self.current)
    }
}

// =============================================================================
// TESTS
// =============================================================================
