//! Extension update subsystem for extup
//!
//! This crate handles:
//! - The per-extension update state machine and its transition stream
//! - Remote version probes (local vs upstream revision)
//! - Transactional updates with backup and rollback
//! - Batch checks (sequential) and batch updates (concurrent)
//! - Filesystem install, uninstall, manifest loading, and discovery

pub mod discovery;
pub mod error;
pub mod fs;
pub mod installer;
pub mod manifest;
pub mod orchestrator;
pub mod probe;
pub mod state;
pub mod updater;

pub use discovery::discover_installed;
pub use error::{Error, Result};
pub use installer::{ExtensionInstaller, FsExtensionInstaller};
pub use manifest::{FsManifestLoader, ManifestLoader};
pub use orchestrator::UpdateOrchestrator;
pub use probe::check_for_update;
pub use state::{
    transition_channel, StateStore, StateTransition, TransitionReporter, UpdateState,
};
pub use updater::{ExtensionUpdater, UpdateInfo};
