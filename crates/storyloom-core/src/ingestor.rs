//! # Ingestor Module
//!
//! Merges an externally produced subgraph batch into a live story.
//!
//! The batch format is *not* the persisted document format: the
//! producer (an AI generator, a seed file) does not know node ids, so
//! choices target nodes **by title**:
//!
//! ```json
//! { "nodes": [ { "title": "...", "text": "...", "npc": "...",
//!   "location": "...", "emotion": "...", "tags": [], "gm_notes": "...",
//!   "choices": [ { "text": "...", "gate": "...", "tags": [],
//!                  "target_title": "..." } ] } ] }
//! ```
//!
//! Ingestion is two-pass: create every node first, then wire choices
//! through a title-to-id map. Partial, recoverable success is the
//! contract: a malformed choice never aborts node creation, and an
//! unresolved title yields an intentionally unwired choice.

use crate::formats::{str_field, tags_field};
use crate::mutation::{MutationEngine, NodeDraft};
use crate::primitives::MAX_BATCH_NODES;
use crate::{Choice, NodeId, Story, StoryError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// =============================================================================
// BATCH TYPES
// =============================================================================

/// One choice as produced externally: targets a node by title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtoChoice {
    pub text: String,
    pub gate: String,
    pub tags: Vec<String>,
    /// Title of the destination proto-node; resolved during ingestion.
    pub target_title: String,
}

/// One node as produced externally, before it has an id.
#[derive(Debug, Clone, Default)]
pub struct ProtoNode {
    pub draft: NodeDraft,
    pub choices: Vec<ProtoChoice>,
}

/// A parsed, structurally valid subgraph batch.
#[derive(Debug, Clone, Default)]
pub struct SubgraphBatch {
    pub nodes: Vec<ProtoNode>,
}

/// Where to hook a freshly ingested subgraph onto the existing story:
/// one new choice on `node_id`, pointing at the first created node.
#[derive(Debug, Clone)]
pub struct AttachPoint {
    pub node_id: NodeId,
    pub choice_text: String,
}

// =============================================================================
// INGESTOR
// =============================================================================

/// The Ingestor validates batch payloads and merges them into a story.
pub struct Ingestor;

impl Ingestor {
    /// Parse a raw batch payload.
    ///
    /// Returns [`StoryError::InvalidBatch`] when the payload is not
    /// JSON, not an object, has no `nodes` array, or the array is
    /// empty, oversized, or contains no object entries. Non-object
    /// entries and non-object choices are skipped; everything below
    /// that is default-tolerant.
    pub fn parse_batch(raw: &str) -> Result<SubgraphBatch, StoryError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| StoryError::InvalidBatch(e.to_string()))?;
        Self::batch_from_value(&value)
    }

    /// Parse an already-materialized JSON value as a batch.
    pub fn batch_from_value(value: &Value) -> Result<SubgraphBatch, StoryError> {
        let obj = value
            .as_object()
            .ok_or_else(|| StoryError::InvalidBatch("payload is not a JSON object".to_string()))?;
        let entries = obj
            .get("nodes")
            .and_then(Value::as_array)
            .ok_or_else(|| StoryError::InvalidBatch("missing \"nodes\" array".to_string()))?;
        if entries.is_empty() {
            return Err(StoryError::InvalidBatch("\"nodes\" array is empty".to_string()));
        }
        if entries.len() > MAX_BATCH_NODES {
            return Err(StoryError::InvalidBatch(format!(
                "batch of {} nodes exceeds maximum allowed {}",
                entries.len(),
                MAX_BATCH_NODES
            )));
        }

        let nodes: Vec<ProtoNode> = entries
            .iter()
            .filter_map(|entry| Some(decode_proto_node(entry.as_object()?)))
            .collect();
        if nodes.is_empty() {
            return Err(StoryError::InvalidBatch(
                "no usable node entries in batch".to_string(),
            ));
        }
        Ok(SubgraphBatch { nodes })
    }

    /// Merge a batch into the story.
    ///
    /// Pass 1 creates every proto-node and records a trimmed-title to
    /// new-id mapping (a later duplicate title overwrites an earlier
    /// one). Pass 2 appends each proto-choice, resolving its
    /// `target_title` through the mapping; an unresolved title yields
    /// an unwired choice rather than an error. When `attach` is given,
    /// its node gains one choice pointing at the first created node.
    ///
    /// The attach node is validated *before* any mutation, so
    /// [`StoryError::NotFound`] leaves the story untouched. Returns
    /// the created ids in creation order.
    pub fn ingest(
        story: &mut Story,
        batch: &SubgraphBatch,
        attach: Option<&AttachPoint>,
    ) -> Result<Vec<NodeId>, StoryError> {
        if batch.nodes.is_empty() {
            return Err(StoryError::InvalidBatch("batch has no nodes".to_string()));
        }
        if let Some(point) = attach {
            if !story.contains_node(&point.node_id) {
                return Err(StoryError::NotFound(point.node_id.clone()));
            }
        }

        // Pass 1: create nodes, map titles to minted ids.
        let mut title_to_id: BTreeMap<String, NodeId> = BTreeMap::new();
        let mut created = Vec::with_capacity(batch.nodes.len());
        for proto in &batch.nodes {
            let title_key = proto.draft.title.trim().to_string();
            let id = MutationEngine::create_node(story, proto.draft.clone());
            title_to_id.insert(title_key, id.clone());
            created.push(id);
        }

        // Pass 2: wire choices by title. An absent or empty target
        // title yields an unwired choice, never an error.
        for (id, proto) in created.iter().zip(&batch.nodes) {
            for proto_choice in &proto.choices {
                let title_key = proto_choice.target_title.trim();
                let target_id = if title_key.is_empty() {
                    NodeId::unwired()
                } else {
                    title_to_id
                        .get(title_key)
                        .cloned()
                        .unwrap_or_else(NodeId::unwired)
                };
                let choice = Choice::new(proto_choice.text.clone(), target_id)
                    .with_gate(proto_choice.gate.clone())
                    .with_tags(proto_choice.tags.iter().cloned());
                MutationEngine::add_choice(story, id, choice)?;
            }
        }

        if let Some(point) = attach {
            if let Some(first) = created.first() {
                MutationEngine::add_choice(
                    story,
                    &point.node_id,
                    Choice::new(point.choice_text.clone(), first.clone()),
                )?;
            }
        }

        Ok(created)
    }
}

/// Decode one proto-node entry, default-tolerant like the document
/// decoder.
fn decode_proto_node(obj: &Map<String, Value>) -> ProtoNode {
    ProtoNode {
        draft: NodeDraft {
            title: str_field(obj, "title"),
            text: str_field(obj, "text"),
            npc: str_field(obj, "npc"),
            location: str_field(obj, "location"),
            emotion: str_field(obj, "emotion"),
            tags: tags_field(obj, "tags").into_iter().collect(),
            gm_notes: str_field(obj, "gm_notes"),
        },
        choices: obj
            .get("choices")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| Some(decode_proto_choice(entry.as_object()?)))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn decode_proto_choice(obj: &Map<String, Value>) -> ProtoChoice {
    ProtoChoice {
        text: str_field(obj, "text"),
        gate: str_field(obj, "gate"),
        tags: tags_field(obj, "tags").into_iter().collect(),
        target_title: str_field(obj, "target_title"),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::ChoiceStatus;

    fn proto(title: &str, targets: &[&str]) -> ProtoNode {
        ProtoNode {
            draft: NodeDraft::new(title, format!("{title} text")),
            choices: targets
                .iter()
                .map(|t| ProtoChoice {
                    text: format!("to {t}"),
                    target_title: (*t).to_string(),
                    ..ProtoChoice::default()
                })
                .collect(),
        }
    }

    #[test]
    fn ingest_wires_choices_by_title() {
        let mut story = Story::new();
        let batch = SubgraphBatch {
            nodes: vec![proto("First", &[]), proto("Second", &["First"])],
        };

        let created = Ingestor::ingest(&mut story, &batch, None).expect("ingest");

        assert_eq!(created.len(), 2);
        let second = story.node(&created[1]).expect("second node");
        assert_eq!(second.choices.len(), 1);
        assert_eq!(second.choices[0].target_id, created[0]);
        assert_eq!(
            MutationEngine::choice_status(&story, &second.choices[0]),
            ChoiceStatus::Wired
        );
    }

    #[test]
    fn unresolved_title_becomes_unwired_choice() {
        let mut story = Story::new();
        let batch = SubgraphBatch {
            nodes: vec![proto("Lone", &["Nowhere"])],
        };

        let created = Ingestor::ingest(&mut story, &batch, None).expect("ingest");
        let lone = story.node(&created[0]).expect("node");
        assert_eq!(lone.choices.len(), 1);
        assert!(lone.choices[0].is_unwired());
    }

    #[test]
    fn duplicate_titles_last_wins() {
        let mut story = Story::new();
        let batch = SubgraphBatch {
            nodes: vec![
                proto("Twin", &[]),
                proto("Twin", &[]),
                proto("Pointer", &["Twin"]),
            ],
        };

        let created = Ingestor::ingest(&mut story, &batch, None).expect("ingest");
        let pointer = story.node(&created[2]).expect("pointer");
        assert_eq!(pointer.choices[0].target_id, created[1]);
    }

    #[test]
    fn attach_appends_choice_to_existing_node() {
        let mut story = Story::new();
        let hook = MutationEngine::create_node(&mut story, NodeDraft::new("Hook", ""));
        let batch = SubgraphBatch {
            nodes: vec![proto("Generated", &[])],
        };

        let created = Ingestor::ingest(
            &mut story,
            &batch,
            Some(&AttachPoint {
                node_id: hook.clone(),
                choice_text: "Continue".to_string(),
            }),
        )
        .expect("ingest");

        let hook_node = story.node(&hook).expect("hook");
        assert_eq!(hook_node.choices.len(), 1);
        assert_eq!(hook_node.choices[0].text, "Continue");
        assert_eq!(hook_node.choices[0].target_id, created[0]);
    }

    #[test]
    fn attach_to_missing_node_leaves_story_untouched() {
        let mut story = Story::new();
        let batch = SubgraphBatch {
            nodes: vec![proto("Generated", &[])],
        };

        let result = Ingestor::ingest(
            &mut story,
            &batch,
            Some(&AttachPoint {
                node_id: NodeId::new("ghost"),
                choice_text: "Continue".to_string(),
            }),
        );

        assert!(matches!(result, Err(StoryError::NotFound(_))));
        assert!(story.is_empty());
    }

    #[test]
    fn empty_batch_is_invalid() {
        let mut story = Story::new();
        let batch = SubgraphBatch { nodes: Vec::new() };
        assert!(matches!(
            Ingestor::ingest(&mut story, &batch, None),
            Err(StoryError::InvalidBatch(_))
        ));
    }

    #[test]
    fn parse_batch_validates_top_level() {
        assert!(matches!(
            Ingestor::parse_batch("not json"),
            Err(StoryError::InvalidBatch(_))
        ));
        assert!(matches!(
            Ingestor::parse_batch(r#"{"nodes": []}"#),
            Err(StoryError::InvalidBatch(_))
        ));
        assert!(matches!(
            Ingestor::parse_batch(r#"{"nodes": "nope"}"#),
            Err(StoryError::InvalidBatch(_))
        ));
        assert!(matches!(
            Ingestor::parse_batch(r#"{"nodes": [1, 2]}"#),
            Err(StoryError::InvalidBatch(_))
        ));
    }

    #[test]
    fn parse_batch_skips_malformed_entries_and_choices() {
        let raw = r#"{"nodes": [
            {"title": "Keep", "choices": [
                {"text": "ok", "target_title": "Keep"},
                "garbage",
                17
            ]},
            "garbage"
        ]}"#;
        let batch = Ingestor::parse_batch(raw).expect("parse");
        assert_eq!(batch.nodes.len(), 1);
        assert_eq!(batch.nodes[0].choices.len(), 1);
        assert_eq!(batch.nodes[0].choices[0].target_title, "Keep");
    }

    #[test]
    fn first_ingested_node_becomes_start_of_empty_story() {
        let mut story = Story::new();
        let batch = SubgraphBatch {
            nodes: vec![proto("Opening", &[])],
        };
        let created = Ingestor::ingest(&mut story, &batch, None).expect("ingest");
        assert_eq!(story.start_node_id, Some(created[0].clone()));
    }
}
