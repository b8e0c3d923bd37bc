//! Command implementations
//!
//! - list: Show installed extensions and where they came from
//! - check: Probe installed extensions for newer revisions
//! - update: Update one extension or everything with an update available

mod common;
pub mod check;
pub mod list;
pub mod update;
