//! # Core Type Definitions
//!
//! This module contains all core types for the Storyloom graph engine:
//! - Node identifiers (`NodeId`)
//! - The entity model (`Choice`, `Node`, `Story`)
//! - Error types (`StoryError`)
//!
//! ## Determinism Guarantees
//!
//! All collections in this module use `BTreeMap`/`BTreeSet` so that
//! iteration order (and therefore every export, report and snapshot)
//! is a pure function of the stored data.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// NODE IDENTIFIER
// =============================================================================

/// Unique identifier for a node (a narrative beat) in a story.
///
/// Freshly created nodes get a uuid-v4 id; decoded documents keep
/// whatever string ids they carry. The empty id is the *unwired*
/// sentinel used by choices whose destination has not been picked yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an existing id string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Generate a fresh globally unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The sentinel id of an intentionally unwired choice.
    #[must_use]
    pub const fn unwired() -> Self {
        Self(String::new())
    }

    /// Whether this is the unwired sentinel.
    #[must_use]
    pub fn is_unwired(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for labels and reports (first few chars).
    ///
    /// Safe on ids shorter than the abbreviation length and on
    /// non-ASCII ids.
    #[must_use]
    pub fn abbrev(&self) -> &str {
        match self.0.char_indices().nth(crate::primitives::ID_ABBREV_LEN) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// CHOICE
// =============================================================================

/// A directed edge candidate from its owning node to a target node.
///
/// The target is a weak reference by id: deleting the target node
/// elsewhere in the story leaves, at worst, a dangling id here, never
/// an ownership cycle. An empty `target_id` means "to be wired later",
/// which is a valid drafting state, distinct from a dangling target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Choice {
    /// Display text (may be empty while being drafted).
    pub text: String,
    /// Destination node id, or the unwired sentinel.
    pub target_id: NodeId,
    /// Free-form labels; duplicates collapse, order is irrelevant.
    pub tags: BTreeSet<String>,
    /// Opaque requirement string, e.g. "Persuasion DC 13".
    pub gate: String,
}

impl Choice {
    /// Create a choice with text and target; tags and gate empty.
    #[must_use]
    pub fn new(text: impl Into<String>, target_id: NodeId) -> Self {
        Self {
            text: text.into(),
            target_id,
            tags: BTreeSet::new(),
            gate: String::new(),
        }
    }

    /// Builder-style gate setter.
    #[must_use]
    pub fn with_gate(mut self, gate: impl Into<String>) -> Self {
        self.gate = gate.into();
        self
    }

    /// Builder-style tag setter.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this choice has no destination yet.
    #[must_use]
    pub fn is_unwired(&self) -> bool {
        self.target_id.is_unwired()
    }
}

// =============================================================================
// NODE
// =============================================================================

/// A narrative beat in the story.
///
/// All string fields default to empty. `choices` is ordered: the
/// sequence is the presentation/selection order and is reorderable by
/// the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Globally unique, immutable after creation.
    pub id: NodeId,
    /// Short heading for the beat.
    pub title: String,
    /// Narrative body (scene or dialogue text).
    pub text: String,
    /// Speaking or featured NPC.
    pub npc: String,
    /// Where the beat takes place.
    pub location: String,
    /// Emotional register, e.g. "wary", "menacing".
    pub emotion: String,
    /// Free-form labels; duplicates collapse, order is irrelevant.
    pub tags: BTreeSet<String>,
    /// Facilitator-only notes, hidden from players.
    pub gm_notes: String,
    /// Outgoing choices in presentation order.
    pub choices: Vec<Choice>,
}

impl Node {
    /// Create an empty node with the given id.
    #[must_use]
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

// =============================================================================
// STORY
// =============================================================================

/// The aggregate root: a titled collection of nodes plus the start id.
///
/// The story exclusively owns its nodes and, transitively, their
/// choices; choices refer to other nodes by id only.
///
/// Invariant: if `nodes` is non-empty, `start_node_id` refers to a key
/// of `nodes`. Mutations that could violate this call `repair_start`.
/// "Stored order" and "first node" always mean ascending-id
/// (`BTreeMap`) order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Story {
    /// Project title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Designated entry node, or `None` for an empty story.
    pub start_node_id: Option<NodeId>,
    /// All nodes, keyed by id.
    pub nodes: BTreeMap<NodeId, Node>,
}

impl Story {
    /// Create a new empty story.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable lookup.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Whether the story contains a node with this id.
    #[must_use]
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the story has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The designated entry node, if the story has one.
    #[must_use]
    pub fn start_node(&self) -> Option<&Node> {
        self.start_node_id.as_ref().and_then(|id| self.nodes.get(id))
    }

    /// First node id in stored (ascending-id) order.
    #[must_use]
    pub fn first_node_id(&self) -> Option<&NodeId> {
        self.nodes.keys().next()
    }

    /// Total number of choices across all nodes.
    #[must_use]
    pub fn choice_count(&self) -> usize {
        self.nodes.values().map(|n| n.choices.len()).sum()
    }

    /// Restore the start-node invariant.
    ///
    /// If the current start id is absent or dangling, the first node
    /// in stored order becomes the start; an empty story gets `None`.
    /// Returns `true` if anything changed.
    pub fn repair_start(&mut self) -> bool {
        let valid = self
            .start_node_id
            .as_ref()
            .is_some_and(|id| self.nodes.contains_key(id));
        if valid || (self.start_node_id.is_none() && self.nodes.is_empty()) {
            return false;
        }
        self.start_node_id = self.first_node_id().cloned();
        true
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors surfaced by the story engine.
///
/// Structural problems inside individual records (a malformed choice,
/// a missing optional field) are recovered locally with defaults and
/// never reach this type; these variants cover genuine caller-visible
/// failures. The core never panics.
#[derive(Debug, Error)]
pub enum StoryError {
    /// A referenced node id is absent from the story.
    #[error("node not found: {0}")]
    NotFound(NodeId),

    /// A choice or history index is outside the valid range.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the sequence at the time of the call.
        len: usize,
    },

    /// An ingestion payload is malformed or empty.
    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    /// A document is not well-formed at the top level.
    #[error("decode error: {0}")]
    Decode(String),

    /// A value failed to serialize.
    ///
    /// Unreachable for any story the mutation service can produce;
    /// kept so the codec signature stays honest.
    #[error("encode error: {0}")]
    Encode(String),

    /// An I/O failure in the app layer.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================
