//! # Markdown Report
//!
//! One-way projection of a story into a facilitator-readable Markdown
//! document. There is no corresponding importer.
//!
//! Output is byte-stable for a given story value: the start node
//! leads, the remaining nodes follow in stored (ascending-id) order,
//! and tag sets serialize sorted. Golden-file tests rely on this.

use crate::{Choice, Story};

/// Render the story as Markdown.
///
/// With `detailed` set, GM notes are included as blockquotes.
#[must_use]
pub fn export_report(story: &Story, detailed: bool) -> String {
    let mut lines: Vec<String> = vec![format!("# {}", story.title), String::new()];
    if !story.description.is_empty() {
        lines.push(story.description.clone());
        lines.push(String::new());
    }

    let start = story.start_node_id.as_ref();
    let ordered = start
        .and_then(|id| story.node(id))
        .into_iter()
        .chain(story.nodes.values().filter(|n| Some(&n.id) != start));

    for node in ordered {
        lines.push(format!("## {} ({})", node.title, node.id.abbrev()));
        let meta: Vec<&str> = [&node.npc, &node.location, &node.emotion]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect();
        if !meta.is_empty() {
            lines.push(format!("*{}*", meta.join(" \u{2022} ")));
        }
        if !node.tags.is_empty() {
            let tags: Vec<&str> = node.tags.iter().map(String::as_str).collect();
            lines.push(format!("Tags: {}", tags.join(", ")));
        }
        lines.push(String::new());
        lines.push(node.text.clone());
        if detailed && !node.gm_notes.is_empty() {
            lines.push(String::new());
            lines.push(format!("> **GM Notes:** {}", node.gm_notes));
        }
        if !node.choices.is_empty() {
            lines.push(String::new());
            lines.push("**Choices**".to_string());
            for choice in &node.choices {
                lines.push(choice_line(choice));
            }
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

/// One bullet per choice: text, gate, abbreviated target, tags.
fn choice_line(choice: &Choice) -> String {
    let gate = if choice.gate.is_empty() {
        String::new()
    } else {
        format!(" [{}]", choice.gate)
    };
    let target = if choice.is_unwired() {
        "(unwired)".to_string()
    } else {
        format!("`{}`", choice.target_id.abbrev())
    };
    let tags = if choice.tags.is_empty() {
        String::new()
    } else {
        let tags: Vec<&str> = choice.tags.iter().map(String::as_str).collect();
        format!(" (tags: {})", tags.join(", "))
    };
    format!(
        "- {}{} \u{2192} {}{}",
        choice.text, gate, target, tags
    )
}

// =============================================================================
// TESTS
// =============================================================================
