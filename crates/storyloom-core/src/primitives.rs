//! # Innate Primitives
//!
//! Hardcoded constants for the Storyloom engine.
//!
//! These are compiled into the binary and immutable at runtime so that
//! every implementation detail callers can observe (placeholders,
//! abbreviations, truncation points, input limits) is pinned.

/// Title given to nodes created with a blank title.
pub const UNTITLED_PLACEHOLDER: &str = "(untitled)";

/// Suffix appended to a duplicated node's title.
pub const COPY_SUFFIX: &str = " (copy)";

/// Number of leading characters shown when an id is abbreviated in
/// reports, labels and CLI output.
pub const ID_ABBREV_LEN: usize = 8;

/// Maximum number of body-text characters in a snapshot node label.
///
/// Longer text is cut and terminated with an ellipsis.
pub const LABEL_TEXT_LIMIT: usize = 160;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum accepted size of a story document, in bytes.
///
/// Documents larger than this are rejected before parsing to prevent
/// memory exhaustion from malicious or corrupted input.
pub const MAX_DOCUMENT_SIZE: usize = 50 * 1024 * 1024; // 50 MB

/// Maximum number of proto-nodes in a single ingestion batch.
///
/// Larger batches are rejected as invalid rather than partially
/// applied.
pub const MAX_BATCH_NODES: usize = 1000;
