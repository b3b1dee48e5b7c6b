//! # Storyloom application library
//!
//! The CLI layer is exposed as a library so the integration tests can
//! drive commands without spawning the binary.

pub mod cli;
