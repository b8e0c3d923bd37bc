//! # extup-core
//!
//! Core library for extup providing:
//! - Install metadata and the runtime extension model
//! - Updater configuration loading (config.yaml)
//! - Shared error type

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::UpdaterConfig;
pub use error::{Error, Result};
pub use types::{Extension, ExtensionInstallMetadata, ExtensionManifest, InstallType};
pub use utils::get_home_dir;
