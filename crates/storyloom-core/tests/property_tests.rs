//! # Property-Based Tests
//!
//! Invariant verification with proptest: codec round-trips, deletion
//! integrity, duplication shape, and playback reversibility over
//! generated stories.

use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;
use storyloom_core::{
    story_from_json, story_to_json, Choice, Ingestor, MutationEngine, Node, NodeDraft, NodeId,
    Playback, ProtoChoice, ProtoNode, Story, SubgraphBatch,
};

// =============================================================================
// STRATEGIES
// =============================================================================

/// Target of a generated choice: wired to a node index, deliberately
/// unwired, or dangling.
#[derive(Debug, Clone)]
enum GenTarget {
    Wired(usize),
    Unwired,
    Dangling,
}

fn target_strategy() -> impl Strategy<Value = GenTarget> {
    prop_oneof![
        4 => (0usize..16).prop_map(GenTarget::Wired),
        1 => Just(GenTarget::Unwired),
        1 => Just(GenTarget::Dangling),
    ]
}

type GenNode = (String, String, Vec<String>, Vec<(String, GenTarget, String)>);

fn node_strategy() -> impl Strategy<Value = GenNode> {
    (
        "[A-Za-z ]{0,12}",
        "[A-Za-z \\n.]{0,40}",
        vec("[a-z]{1,6}", 0..4),
        vec(("[A-Za-z ]{0,10}", target_strategy(), "[A-Za-z 0-9]{0,12}"), 0..4),
    )
}

/// Assemble a structurally valid story (start invariant holds) from
/// generated node descriptions. Ids are stable `n00..` strings so
/// failures shrink readably.
fn build_story(gen_nodes: Vec<GenNode>, start_pick: usize) -> Story {
    let mut story = Story::new();
    let ids: Vec<NodeId> = (0..gen_nodes.len())
        .map(|i| NodeId::new(format!("n{i:02}")))
        .collect();
    for (i, (title, text, tags, choices)) in gen_nodes.into_iter().enumerate() {
        let mut node = Node::new(ids[i].clone());
        node.title = title;
        node.text = text;
        node.tags = tags.into_iter().collect::<BTreeSet<_>>();
        node.choices = choices
            .into_iter()
            .enumerate()
            .map(|(k, (text, target, gate))| {
                let target_id = match target {
                    GenTarget::Wired(pick) => ids[pick % ids.len()].clone(),
                    GenTarget::Unwired => NodeId::unwired(),
                    GenTarget::Dangling => NodeId::new(format!("ghost-{k}")),
                };
                Choice::new(text, target_id).with_gate(gate)
            })
            .collect();
        story.nodes.insert(node.id.clone(), node);
    }
    if !story.nodes.is_empty() {
        let keys: Vec<NodeId> = story.nodes.keys().cloned().collect();
        story.start_node_id = Some(keys[start_pick % keys.len()].clone());
    }
    story
}

fn story_strategy() -> impl Strategy<Value = Story> {
    (vec(node_strategy(), 1..8), 0usize..8).prop_map(|(nodes, pick)| build_story(nodes, pick))
}

/// Start-node invariant: `None` iff empty, otherwise a present key.
fn start_invariant_holds(story: &Story) -> bool {
    match &story.start_node_id {
        None => story.is_empty(),
        Some(id) => story.contains_node(id),
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Decode(Encode(S)) is structurally equal to S.
    #[test]
    fn roundtrip_idempotent(story in story_strategy()) {
        let encoded = story_to_json(&story).expect("encode");
        let decoded = story_from_json(&encoded).expect("decode");
        prop_assert_eq!(decoded, story);
    }

    /// Encoding the same story twice yields identical bytes.
    #[test]
    fn encode_deterministic(story in story_strategy()) {
        let first = story_to_json(&story).expect("encode");
        let second = story_to_json(&story).expect("encode");
        prop_assert_eq!(first, second);
    }

    /// After deleting any node, no remaining choice targets it and
    /// the start-node invariant still holds.
    #[test]
    fn delete_removes_all_inbound_references(
        story in story_strategy(),
        pick in 0usize..8
    ) {
        let mut story = story;
        let keys: Vec<NodeId> = story.nodes.keys().cloned().collect();
        let victim = keys[pick % keys.len()].clone();

        MutationEngine::delete_node(&mut story, &victim);

        prop_assert!(!story.contains_node(&victim));
        for node in story.nodes.values() {
            for choice in &node.choices {
                prop_assert_ne!(&choice.target_id, &victim);
            }
        }
        prop_assert!(start_invariant_holds(&story));
    }

    /// A duplicate has a fresh id but the same choice count and the
    /// same targets as its source.
    #[test]
    fn duplicate_preserves_choice_shape(
        story in story_strategy(),
        pick in 0usize..8
    ) {
        let mut story = story;
        let keys: Vec<NodeId> = story.nodes.keys().cloned().collect();
        let source_id = keys[pick % keys.len()].clone();
        let before: Vec<NodeId> = story.nodes.keys().cloned().collect();

        let copy_id = MutationEngine::duplicate_node(&mut story, &source_id).expect("duplicate");

        prop_assert!(!before.contains(&copy_id));
        let source = story.node(&source_id).expect("source");
        let copy = story.node(&copy_id).expect("copy");
        prop_assert_eq!(copy.choices.len(), source.choices.len());
        for (a, b) in copy.choices.iter().zip(&source.choices) {
            prop_assert_eq!(&a.target_id, &b.target_id);
        }
    }

    /// k choices followed by k step-backs restore the original
    /// single-entry history.
    #[test]
    fn playback_step_back_inverts_choose(
        story in story_strategy(),
        picks in vec(0usize..4, 0..12)
    ) {
        let mut story = story;
        let mut playback = Playback::start_default(&mut story).expect("non-empty story");
        let origin = playback.current_id().clone();

        let mut taken = 0usize;
        for pick in picks {
            let available = playback
                .current_node(&story)
                .map(|n| n.choices.len())
                .unwrap_or(0);
            if available == 0 {
                break;
            }
            playback.choose(&story, pick % available).expect("choose");
            taken += 1;
        }
        for _ in 0..taken {
            playback.step_back();
        }

        prop_assert_eq!(playback.history(), &[origin.clone()]);
        prop_assert_eq!(playback.current_id(), &origin);
    }

    /// Every ingested choice whose target title names a batch member
    /// ends up wired to a node created by that same batch.
    #[test]
    fn ingestion_wires_in_batch_titles(
        titles in vec("[A-Z][a-z]{1,8}", 1..6),
        link_picks in vec((0usize..6, 0usize..6), 0..8)
    ) {
        let mut batch = SubgraphBatch {
            nodes: titles
                .iter()
                .map(|t| ProtoNode {
                    draft: NodeDraft::new(t.clone(), ""),
                    choices: Vec::new(),
                })
                .collect(),
        };
        for (from, to) in link_picks {
            let from = from % titles.len();
            let to = to % titles.len();
            batch.nodes[from].choices.push(ProtoChoice {
                text: format!("to {}", titles[to]),
                target_title: titles[to].clone(),
                ..ProtoChoice::default()
            });
        }

        let mut story = Story::new();
        let created = Ingestor::ingest(&mut story, &batch, None).expect("ingest");

        prop_assert_eq!(created.len(), titles.len());
        for id in &created {
            for choice in &story.node(id).expect("created").choices {
                prop_assert!(!choice.is_unwired());
                prop_assert!(created.contains(&choice.target_id));
            }
        }
        prop_assert!(start_invariant_holds(&story));
    }
}
