//! # storyloom-core
//!
//! The deterministic story-graph engine for Storyloom - THE LOGIC.
//!
//! This crate implements the CORE of a branching dialogue/story
//! planner: the node/choice data model, the mutation operations that
//! preserve referential integrity, the canonical JSON document codec,
//! subgraph ingestion for externally generated content, and the
//! playback state machine used to rehearse a path.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Holds no global or ambient state; every operation takes the
//!   Story (and, for playback, the Playback state) explicitly, so
//!   multiple independent stories can coexist
//! - Is single-threaded and synchronous; `&mut` ownership is the
//!   locking story, hosts serialize concurrent access themselves
//! - Performs no I/O: documents and batches arrive as materialized
//!   data and leave the same way
//! - Never panics; every failure is a typed [`StoryError`]
//! - Iterates deterministically (`BTreeMap`/`BTreeSet` only)

// =============================================================================
// MODULES
// =============================================================================

pub mod formats;
pub mod ingestor;
pub mod mutation;
pub mod playback;
pub mod primitives;
pub mod query;
pub mod snapshot;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Choice, Node, NodeId, Story, StoryError};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use ingestor::{AttachPoint, Ingestor, ProtoChoice, ProtoNode, SubgraphBatch};
pub use mutation::{ChoiceStatus, MoveDirection, MutationEngine, NodeDraft};
pub use playback::Playback;

// =============================================================================
// RE-EXPORTS: Projections & Formats
// =============================================================================

pub use formats::document::{story_from_json, story_from_value, story_to_json, story_to_value};
pub use formats::report::export_report;
pub use query::{search_nodes, world_summary, WorldSummary};
pub use snapshot::{GraphSnapshot, SnapshotEdge, SnapshotNode};
