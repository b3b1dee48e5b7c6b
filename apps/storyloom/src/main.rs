//! # Storyloom - Branching Story Planner
//!
//! The main binary for the Storyloom story-graph engine.
//!
//! This application provides:
//! - CLI interface for authoring, validating and rehearsing stories
//! - File I/O for story documents, ingestion batches and reports
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │              apps/storyloom (THE BINARY)       │
//! │                                                │
//! │  ┌─────────────┐        ┌──────────────────┐   │
//! │  │    CLI      │        │    File I/O      │   │
//! │  │   (clap)    │        │ (load/save/seed) │   │
//! │  └──────┬──────┘        └────────┬─────────┘   │
//! │         └──────────┬─────────────┘             │
//! │                    ▼                           │
//! │          ┌──────────────────┐                  │
//! │          │  storyloom-core  │                  │
//! │          │   (THE LOGIC)    │                  │
//! │          └──────────────────┘                  │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Create the bundled demo story
//! storyloom -f grol.json seed
//!
//! # Inspect and validate
//! storyloom -f grol.json status
//! storyloom -f grol.json validate
//!
//! # Merge a generated subgraph and rehearse a path
//! storyloom -f grol.json ingest --batch court.json
//! storyloom -f grol.json walk 0 1
//! ```

use clap::Parser;
use storyloom::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments first so --verbose can widen the filter.
    let cli = cli::Cli::parse();

    // Initialize tracing; STORYLOOM_LOG_FORMAT=json enables
    // machine-parseable output.
    let log_format = std::env::var("STORYLOOM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "storyloom=debug"
    } else {
        "storyloom=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Storyloom startup banner.
fn print_banner() {
    println!(
        r#"
  ─────────────────────────────────────────
   S T O R Y L O O M   v{}
   beats • gated choices • rehearsal
  ─────────────────────────────────────────
"#,
        env!("CARGO_PKG_VERSION")
    );
}
