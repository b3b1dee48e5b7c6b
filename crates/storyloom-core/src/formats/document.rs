//! # Canonical Document Codec
//!
//! The persisted story format: a single JSON object holding the whole
//! story. Encode is derived and total; decode is hand-rolled and
//! tolerant, so a half-written or foreign document loads with
//! documented defaults instead of failing outright.
//!
//! ```json
//! { "title": "...", "description": "...", "start_node_id": null,
//!   "nodes": { "<id>": { "id": "...", "title": "...", "text": "...",
//!     "npc": "...", "location": "...", "emotion": "...", "tags": [],
//!     "gm_notes": "...", "choices": [ { "text": "...",
//!       "target_id": "...", "tags": [], "gate": "..." } ] } } }
//! ```
//!
//! Recovery policy: only invalid JSON, a non-object top level, or an
//! oversized payload is a [`StoryError::Decode`]. Everything below the
//! top level is recovered locally: missing or wrong-typed fields take
//! defaults, non-object node and choice entries are skipped, unknown
//! fields are ignored. The input is never mutated.

use crate::formats::{str_field, str_field_or, tags_field};
use crate::primitives::{MAX_DOCUMENT_SIZE, UNTITLED_PLACEHOLDER};
use crate::{Choice, Node, NodeId, Story, StoryError};
use serde_json::{Map, Value};

// =============================================================================
// ENCODE
// =============================================================================

/// Encode a story as a canonical JSON value.
///
/// Stable under repeated encode/decode/encode and total over every
/// story the mutation service can produce.
pub fn story_to_value(story: &Story) -> Result<Value, StoryError> {
    serde_json::to_value(story).map_err(|e| StoryError::Encode(e.to_string()))
}

/// Encode a story as pretty-printed canonical JSON text.
pub fn story_to_json(story: &Story) -> Result<String, StoryError> {
    serde_json::to_string_pretty(story).map_err(|e| StoryError::Encode(e.to_string()))
}

// =============================================================================
// DECODE
// =============================================================================

/// Decode a story from JSON text.
///
/// Rejects oversized payloads before parsing.
pub fn story_from_json(raw: &str) -> Result<Story, StoryError> {
    if raw.len() > MAX_DOCUMENT_SIZE {
        return Err(StoryError::Decode(format!(
            "document size {} bytes exceeds maximum allowed {} bytes",
            raw.len(),
            MAX_DOCUMENT_SIZE
        )));
    }
    let value: Value =
        serde_json::from_str(raw).map_err(|e| StoryError::Decode(e.to_string()))?;
    story_from_value(&value)
}

/// Decode a story from an already-parsed JSON value.
pub fn story_from_value(value: &Value) -> Result<Story, StoryError> {
    let obj = value
        .as_object()
        .ok_or_else(|| StoryError::Decode("document is not a JSON object".to_string()))?;

    let mut story = Story {
        title: str_field(obj, "title"),
        description: str_field(obj, "description"),
        start_node_id: obj
            .get("start_node_id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(NodeId::new),
        nodes: obj
            .get("nodes")
            .and_then(Value::as_object)
            .map(|nodes| {
                nodes
                    .iter()
                    .filter_map(|(key, entry)| {
                        let node = decode_node(key, entry.as_object()?);
                        Some((node.id.clone(), node))
                    })
                    .collect()
            })
            .unwrap_or_default(),
    };

    // The engine owns the start-node invariant, so a document carrying
    // a dangling or absent start id loads repaired.
    story.repair_start();
    Ok(story)
}

/// Decode one node entry. The map key is authoritative for the id.
fn decode_node(key: &str, obj: &Map<String, Value>) -> Node {
    Node {
        id: NodeId::new(key),
        title: str_field_or(obj, "title", UNTITLED_PLACEHOLDER),
        text: str_field(obj, "text"),
        npc: str_field(obj, "npc"),
        location: str_field(obj, "location"),
        emotion: str_field(obj, "emotion"),
        tags: tags_field(obj, "tags"),
        gm_notes: str_field(obj, "gm_notes"),
        choices: obj
            .get("choices")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| Some(decode_choice(entry.as_object()?)))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Decode one choice entry; non-object entries were already skipped.
fn decode_choice(obj: &Map<String, Value>) -> Choice {
    Choice {
        text: str_field(obj, "text"),
        target_id: NodeId::new(str_field(obj, "target_id")),
        tags: tags_field(obj, "tags"),
        gate: str_field(obj, "gate"),
    }
}

// =============================================================================
// TESTS
// =============================================================================
