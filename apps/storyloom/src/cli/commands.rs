//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! All file I/O for the workspace lives here; the core never touches
//! the filesystem.

use std::path::{Path, PathBuf};
use storyloom_core::{
    export_report, story_from_json, story_to_json, world_summary, AttachPoint, ChoiceStatus,
    Ingestor, MutationEngine, NodeId, Playback, Story, StoryError,
};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for story documents (50 MB).
///
/// Matches the core's document limit; checked before reading so an
/// oversized file never reaches memory.
const MAX_STORY_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Maximum file size for ingestion batches (10 MB).
const MAX_BATCH_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), StoryError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| StoryError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(StoryError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate a file path before reading.
///
/// Canonicalizes the path (resolving symlinks and "..") and ensures it
/// exists and is a regular file, so a path like "../../etc/passwd"
/// cannot slip through from a script.
fn validate_file_path(path: &Path) -> Result<PathBuf, StoryError> {
    let canonical = path
        .canonicalize()
        .map_err(|e| StoryError::Io(format!("Invalid file path '{}': {}", path.display(), e)))?;

    if !canonical.is_file() {
        return Err(StoryError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, StoryError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        StoryError::Io(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(StoryError::Io(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| StoryError::Io("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// STORY FILE I/O
// =============================================================================

/// Load a story document from disk.
pub fn load_story(path: &Path) -> Result<Story, StoryError> {
    let canonical = validate_file_path(path)?;
    validate_file_size(&canonical, MAX_STORY_FILE_SIZE)?;
    let raw = std::fs::read_to_string(&canonical)
        .map_err(|e| StoryError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;
    story_from_json(&raw)
}

/// Save a story document to disk (whole-document overwrite).
pub fn save_story(path: &Path, story: &Story) -> Result<(), StoryError> {
    let target = validate_output_path(path)?;
    let encoded = story_to_json(story)?;
    std::fs::write(&target, encoded)
        .map_err(|e| StoryError::Io(format!("Cannot write '{}': {}", path.display(), e)))
}

/// Load the story, or start a fresh one if the file does not exist.
fn load_story_or_new(path: &Path) -> Result<Story, StoryError> {
    if path.exists() {
        load_story(path)
    } else {
        tracing::info!("Story file {:?} not found, starting empty", path);
        Ok(Story::new())
    }
}

/// Number of unwired or dangling choices across the whole story.
fn unresolved_count(story: &Story) -> usize {
    story
        .nodes
        .keys()
        .filter_map(|id| MutationEngine::unresolved_choices(story, id).ok())
        .map(|list| list.len())
        .sum()
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show story status.
pub fn cmd_status(story_path: &Path, json_mode: bool) -> Result<(), StoryError> {
    let story = load_story(story_path)?;
    let summary = world_summary(&story);
    let start_label = story
        .start_node()
        .map(|n| format!("{} ({})", n.title, n.id.abbrev()))
        .unwrap_or_else(|| "n/a".to_string());

    if json_mode {
        let output = serde_json::json!({
            "story": story_path.to_string_lossy(),
            "title": story.title,
            "nodes": story.node_count(),
            "choices": story.choice_count(),
            "unresolved_choices": unresolved_count(&story),
            "start_node_id": story.start_node_id.as_ref().map(|id| id.as_str()),
            "npcs": summary.npcs.len(),
            "locations": summary.locations.len(),
            "tags": summary.tags.len(),
        });
        println!("{}", output);
    } else {
        println!("Story:      {}", story.title);
        println!("File:       {}", story_path.display());
        println!("Nodes:      {}", story.node_count());
        println!("Choices:    {}", story.choice_count());
        println!("Unresolved: {}", unresolved_count(&story));
        println!("Start:      {}", start_label);
        println!(
            "World:      {} NPCs, {} locations, {} tags",
            summary.npcs.len(),
            summary.locations.len(),
            summary.tags.len()
        );
    }
    Ok(())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// List unwired and dangling choices per node.
pub fn cmd_validate(story_path: &Path, json_mode: bool) -> Result<(), StoryError> {
    let story = load_story(story_path)?;

    let mut findings = Vec::new();
    for (id, node) in &story.nodes {
        for (index, status) in MutationEngine::unresolved_choices(&story, id)? {
            let kind = match status {
                ChoiceStatus::Unwired => "unwired",
                ChoiceStatus::Dangling => "dangling",
                ChoiceStatus::Wired => continue,
            };
            findings.push((node, index, kind));
        }
    }

    if json_mode {
        let output: Vec<_> = findings
            .iter()
            .map(|(node, index, kind)| {
                serde_json::json!({
                    "node_id": node.id.as_str(),
                    "node_title": node.title,
                    "choice_index": index,
                    "kind": kind,
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(output));
        return Ok(());
    }

    if findings.is_empty() {
        println!("No unwired or dangling choices.");
        return Ok(());
    }
    for (node, index, kind) in &findings {
        let text = node
            .choices
            .get(*index)
            .map(|c| c.text.as_str())
            .unwrap_or_default();
        println!(
            "{} ({}): choice #{} \"{}\" is {}",
            node.title,
            node.id.abbrev(),
            index,
            text,
            kind
        );
    }
    println!("{} unresolved choice(s).", findings.len());
    Ok(())
}

// =============================================================================
// REPORT COMMAND
// =============================================================================

/// Export a Markdown report.
pub fn cmd_report(story_path: &Path, output: &Path, detailed: bool) -> Result<(), StoryError> {
    let story = load_story(story_path)?;
    let report = export_report(&story, detailed);
    let target = validate_output_path(output)?;
    std::fs::write(&target, report)
        .map_err(|e| StoryError::Io(format!("Cannot write '{}': {}", output.display(), e)))?;
    tracing::info!(
        "Wrote {} report for {} node(s) to {:?}",
        if detailed { "detailed" } else { "summary" },
        story.node_count(),
        output
    );
    Ok(())
}

// =============================================================================
// INGEST COMMAND
// =============================================================================

/// Merge a subgraph batch into the story file.
pub fn cmd_ingest(
    story_path: &Path,
    batch_path: &Path,
    attach: Option<&str>,
    attach_text: &str,
) -> Result<(), StoryError> {
    let mut story = load_story_or_new(story_path)?;

    let canonical = validate_file_path(batch_path)?;
    validate_file_size(&canonical, MAX_BATCH_FILE_SIZE)?;
    let raw = std::fs::read_to_string(&canonical)
        .map_err(|e| StoryError::Io(format!("Cannot read '{}': {}", batch_path.display(), e)))?;
    let batch = Ingestor::parse_batch(&raw)?;

    let attach_point = attach.map(|id| AttachPoint {
        node_id: NodeId::new(id),
        choice_text: attach_text.to_string(),
    });
    let created = Ingestor::ingest(&mut story, &batch, attach_point.as_ref())?;

    save_story(story_path, &story)?;

    println!("Ingested {} node(s):", created.len());
    for id in &created {
        let title = story.node(id).map(|n| n.title.as_str()).unwrap_or_default();
        println!("  {} ({})", title, id.abbrev());
    }
    Ok(())
}

// =============================================================================
// WALK COMMAND
// =============================================================================

/// Rehearse a path through the story by choice indices.
pub fn cmd_walk(
    story_path: &Path,
    start: Option<&str>,
    choices: &[usize],
    show_gm: bool,
) -> Result<(), StoryError> {
    let mut story = load_story(story_path)?;

    let mut playback = match start {
        Some(id) => Playback::start(&story, &NodeId::new(id))?,
        None => match Playback::start_default(&mut story) {
            Some(p) => p,
            None => {
                println!("No nodes in the story yet.");
                return Ok(());
            }
        },
    };

    print_beat(&story, &playback, show_gm);
    for &index in choices {
        playback.choose(&story, index)?;
        print_beat(&story, &playback, show_gm);
    }

    let titles: Vec<String> = playback
        .history()
        .iter()
        .map(|id| {
            story
                .node(id)
                .map(|n| n.title.clone())
                .unwrap_or_else(|| format!("({})", id.abbrev()))
        })
        .collect();
    println!("History: {}", titles.join(" \u{2192} "));
    Ok(())
}

/// Print the current beat: title, meta, text and numbered choices.
fn print_beat(story: &Story, playback: &Playback, show_gm: bool) {
    println!();
    let Some(node) = playback.current_node(story) else {
        println!("!! Current node missing ({}).", playback.current_id().abbrev());
        return;
    };

    println!("### {}", node.title);
    let meta: Vec<&str> = [&node.npc, &node.location, &node.emotion]
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(String::as_str)
        .collect();
    if !meta.is_empty() {
        println!("{}", meta.join(" \u{2022} "));
    }
    if !node.text.is_empty() {
        println!("{}", node.text);
    }
    if show_gm && !node.gm_notes.is_empty() {
        println!("GM: {}", node.gm_notes);
    }
    if node.choices.is_empty() {
        println!("End of branch.");
        return;
    }
    for (i, choice) in node.choices.iter().enumerate() {
        let gate = if choice.gate.is_empty() {
            String::new()
        } else {
            format!("  [{}]", choice.gate)
        };
        println!("  {}. {}{}", i, choice.text, gate);
    }
}

// =============================================================================
// SEED COMMAND
// =============================================================================

/// The bundled demo story, in the ingestion batch format (targets by
/// title). Two of the gated choices deliberately point at beats that
/// are not in the batch, so a fresh seed shows unwired choices in
/// `validate`.
const SEED_BATCH: &str = r#"{
  "nodes": [
    {
      "title": "Throne of King Grol",
      "text": "The hall opens wide. Grol leans forward, crown of twisted iron. 'You come uninvited.'",
      "npc": "King Grol",
      "location": "Cragmaw Castle - Chamber 5",
      "emotion": "menacing",
      "tags": ["intro", "grol"],
      "gm_notes": "He wants tribute or to intimidate them. Hidden Devourer influence.",
      "choices": [
        {"text": "Offer gold tribute", "target_title": "Tribute Accepted"},
        {"text": "Threaten him", "target_title": "Unholy Strength Stirs", "gate": "Intimidation DC15"},
        {"text": "Parley about the map", "target_title": "Trade for the Map"}
      ]
    },
    {
      "title": "Tribute Accepted",
      "text": "Grol grins too wide. The court hushes. Something in the rafters clicks. He asks for more.",
      "npc": "King Grol",
      "location": "Chamber 5",
      "emotion": "greedy",
      "tags": ["negotiation"],
      "gm_notes": "He will betray any deal.",
      "choices": [
        {"text": "Appeal to pride", "target_title": "A Toast to Kings"},
        {"text": "Reveal a secret", "target_title": "Whispers in the Dark", "gate": "Deception DC14"}
      ]
    },
    {
      "title": "Unholy Strength Stirs",
      "text": "Grol's flesh splits; eyes bloom like ulcers. The crowd gasps. Shadows thicken.",
      "npc": "King Grol",
      "location": "Chamber 5",
      "emotion": "wrathful",
      "tags": ["phase2", "combat"],
      "gm_notes": "Phase 2 boosts; psychic bleed."
    },
    {
      "title": "Trade for the Map",
      "text": "He considers a trade. The map sweats ink. 'What do you offer, soft things?'",
      "npc": "King Grol",
      "location": "Chamber 5",
      "emotion": "calculating",
      "tags": ["map", "deal"],
      "gm_notes": "He wants leverage on the Devourer cult.",
      "choices": [
        {"text": "Promise to slay a rival", "target_title": "A Rival Named"},
        {"text": "Offer a cursed relic", "target_title": "The Relic Hungers", "gate": "Arcana DC13"}
      ]
    }
  ]
}"#;

/// Write the bundled demo story to the story path.
pub fn cmd_seed(story_path: &Path, force: bool) -> Result<(), StoryError> {
    if story_path.exists() && !force {
        return Err(StoryError::Io(format!(
            "'{}' already exists; pass --force to overwrite",
            story_path.display()
        )));
    }

    let mut story = Story::new();
    story.title = "Cragmaw: King Grol's Gambit".to_string();
    story.description =
        "A branching confrontation with King Grol; humor curls around cosmic dread.".to_string();

    let batch = Ingestor::parse_batch(SEED_BATCH)?;
    let created = Ingestor::ingest(&mut story, &batch, None)?;

    save_story(story_path, &story)?;
    println!(
        "Seeded '{}' with {} node(s).",
        story_path.display(),
        created.len()
    );
    Ok(())
}
