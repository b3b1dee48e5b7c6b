//! # Storyloom CLI Module
//!
//! This module implements the CLI interface for Storyloom.
//!
//! ## Available Commands
//!
//! - `status` - Show story status (default when no subcommand given)
//! - `validate` - List unwired and dangling choices
//! - `report` - Export a Markdown report
//! - `ingest` - Merge a generated subgraph batch into the story
//! - `walk` - Rehearse a path by choice indices
//! - `seed` - Write the bundled demo story

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storyloom_core::StoryError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Storyloom - Branching Story Planner
///
/// Author branching dialogue and story beats, connect them with gated
/// choices, rehearse paths, and exchange the graph as canonical JSON.
#[derive(Parser, Debug)]
#[command(name = "storyloom")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the story document
    #[arg(short = 'f', long, global = true, default_value = "story.json")]
    pub story: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show story status
    Status,

    /// List unwired and dangling choices per node
    Validate,

    /// Export a Markdown report
    Report {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Include GM notes in the report
        #[arg(short, long)]
        detailed: bool,
    },

    /// Merge a generated subgraph batch into the story
    Ingest {
        /// Path to the batch payload (JSON, targets by title)
        #[arg(short, long)]
        batch: PathBuf,

        /// Existing node id to hook the subgraph onto
        #[arg(long)]
        attach: Option<String>,

        /// Text of the attaching choice
        #[arg(long, default_value = "Continue")]
        attach_text: String,
    },

    /// Rehearse a path through the story by choice indices
    Walk {
        /// Node id to start at (defaults to the story's start node)
        #[arg(long)]
        start: Option<String>,

        /// Show GM notes along the way
        #[arg(long)]
        show_gm: bool,

        /// Zero-based choice indices to follow, in order
        choices: Vec<usize>,
    },

    /// Write the bundled demo story to the story path
    Seed {
        /// Overwrite an existing story file
        #[arg(long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), StoryError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Status) | None => cmd_status(&cli.story, json_mode),
        Some(Commands::Validate) => cmd_validate(&cli.story, json_mode),
        Some(Commands::Report { output, detailed }) => cmd_report(&cli.story, &output, detailed),
        Some(Commands::Ingest {
            batch,
            attach,
            attach_text,
        }) => cmd_ingest(&cli.story, &batch, attach.as_deref(), &attach_text),
        Some(Commands::Walk {
            start,
            show_gm,
            choices,
        }) => cmd_walk(&cli.story, start.as_deref(), &choices, show_gm),
        Some(Commands::Seed { force }) => cmd_seed(&cli.story, force),
    }
}
