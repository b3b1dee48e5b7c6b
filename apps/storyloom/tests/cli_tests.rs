//! # CLI Integration Tests
//!
//! Drive the command implementations against real temp files: seed,
//! reload, ingest into, report from and walk a story document.

use std::fs;
use storyloom::cli::{cmd_ingest, cmd_report, cmd_seed, cmd_status, cmd_validate, cmd_walk, load_story, save_story};
use storyloom_core::{MutationEngine, NodeDraft, Story, StoryError};
use tempfile::TempDir;

fn temp_path(dir: &TempDir, name: &str) -> std::path::PathBuf {
    dir.path().join(name)
}

#[test]
fn seed_then_load_roundtrip() {
    let dir = TempDir::new().expect("tempdir");
    let story_path = temp_path(&dir, "grol.json");

    cmd_seed(&story_path, false).expect("seed");
    let story = load_story(&story_path).expect("load");

    assert_eq!(story.title, "Cragmaw: King Grol's Gambit");
    assert_eq!(story.node_count(), 4);
    // The throne was created first and so became the start node
    let start = story.start_node().expect("start node");
    assert_eq!(start.title, "Throne of King Grol");

    // Re-seeding without --force must refuse
    assert!(matches!(
        cmd_seed(&story_path, false),
        Err(StoryError::Io(_))
    ));
    // With --force it overwrites
    cmd_seed(&story_path, true).expect("forced seed");
}

#[test]
fn save_and_load_are_inverse() {
    let dir = TempDir::new().expect("tempdir");
    let story_path = temp_path(&dir, "story.json");

    let mut story = Story::new();
    story.title = "Round Trip".to_string();
    MutationEngine::create_node(&mut story, NodeDraft::new("Only", "beat"));

    save_story(&story_path, &story).expect("save");
    let loaded = load_story(&story_path).expect("load");
    assert_eq!(loaded, story);
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let result = load_story(&temp_path(&dir, "nope.json"));
    assert!(matches!(result, Err(StoryError::Io(_))));
}

#[test]
fn report_writes_markdown() {
    let dir = TempDir::new().expect("tempdir");
    let story_path = temp_path(&dir, "grol.json");
    let report_path = temp_path(&dir, "out.md");

    cmd_seed(&story_path, false).expect("seed");
    cmd_report(&story_path, &report_path, true).expect("report");

    let report = fs::read_to_string(&report_path).expect("read report");
    assert!(report.starts_with("# Cragmaw: King Grol's Gambit"));
    assert!(report.contains("## Throne of King Grol"));
    assert!(report.contains("> **GM Notes:**"));
}

#[test]
fn ingest_merges_batch_into_story_file() {
    let dir = TempDir::new().expect("tempdir");
    let story_path = temp_path(&dir, "grol.json");
    let batch_path = temp_path(&dir, "batch.json");

    cmd_seed(&story_path, false).expect("seed");
    let hook_id = load_story(&story_path)
        .expect("load")
        .start_node_id
        .expect("seeded start");

    fs::write(
        &batch_path,
        r#"{"nodes": [{"title": "Dungeon", "text": "Stairs down.",
            "choices": [{"text": "Back up", "target_title": "Dungeon"}]}]}"#,
    )
    .expect("write batch");

    cmd_ingest(&story_path, &batch_path, Some(hook_id.as_str()), "Descend").expect("ingest");

    let story = load_story(&story_path).expect("reload");
    assert_eq!(story.node_count(), 5);
    let hook = story.node(&hook_id).expect("hook node");
    let attached = hook.choices.last().expect("attached choice");
    assert_eq!(attached.text, "Descend");
    assert_eq!(
        story.node(&attached.target_id).expect("new node").title,
        "Dungeon"
    );
}

#[test]
fn status_validate_and_walk_run_on_seeded_story() {
    let dir = TempDir::new().expect("tempdir");
    let story_path = temp_path(&dir, "grol.json");
    cmd_seed(&story_path, false).expect("seed");

    cmd_status(&story_path, true).expect("status");
    cmd_validate(&story_path, true).expect("validate");
    // Throne -> Tribute Accepted -> (unwired "A Toast to Kings") is a
    // legal walk ending in the missing-node condition.
    cmd_walk(&story_path, None, &[0, 0], false).expect("walk");
    // An out-of-range choice surfaces as a typed error.
    assert!(matches!(
        cmd_walk(&story_path, None, &[9], false),
        Err(StoryError::IndexOutOfRange { .. })
    ));
}
