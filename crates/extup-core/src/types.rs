//! Extension model types
//!
//! `ExtensionInstallMetadata` records where an extension came from and is
//! persisted next to the installed files. `Extension` is the runtime view
//! the update subsystem operates on.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// File inside an installed extension directory holding its install metadata
pub const INSTALL_METADATA_FILE: &str = ".extup-install.json";

/// Default manifest file name
pub const DEFAULT_MANIFEST_FILE: &str = "extension.yaml";

/// How an extension was installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallType {
    /// Cloned from a git remote
    Git,
    /// Installed from a GitHub release of a git repository
    GithubRelease,
    /// Copied from a local directory
    Local,
    /// Symlink-style install pointing at a working directory
    Link,
}

impl InstallType {
    /// Whether the source can be re-fetched to detect newer content
    pub fn is_remote_tracked(self) -> bool {
        matches!(self, InstallType::Git | InstallType::GithubRelease)
    }
}

impl fmt::Display for InstallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallType::Git => write!(f, "git"),
            InstallType::GithubRelease => write!(f, "github-release"),
            InstallType::Local => write!(f, "local"),
            InstallType::Link => write!(f, "link"),
        }
    }
}

/// Provenance of an installed extension
///
/// Persisted as `{ "type": ..., "source": ..., "ref": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionInstallMetadata {
    #[serde(rename = "type")]
    pub install_type: InstallType,

    /// URI or filesystem path identifying the origin
    pub source: String,

    /// Branch, tag or commit; `None` tracks the default branch tip
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
}

impl ExtensionInstallMetadata {
    pub fn new(install_type: InstallType, source: impl Into<String>) -> Self {
        Self {
            install_type,
            source: source.into(),
            git_ref: None,
        }
    }

    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    /// Read metadata from an installed extension directory
    ///
    /// Returns `Ok(None)` when the directory carries no metadata file.
    pub fn load(dir: &Utf8Path) -> Result<Option<Self>> {
        let path = dir.join(INSTALL_METADATA_FILE);
        if !path.exists() {
            debug!("No install metadata at {}", path);
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::invalid_metadata(path.as_str(), e.to_string()))
    }

    /// Write metadata into an installed extension directory
    pub fn save(&self, dir: &Utf8Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join(INSTALL_METADATA_FILE), content)?;
        Ok(())
    }
}

/// Extension manifest as declared by the extension itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionManifest {
    pub name: String,

    /// Free-form version string
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Keys the update subsystem does not interpret
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml_ng::Value>,
}

/// Runtime view of one installed extension
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    /// Unique across the installed set
    pub name: String,

    /// Version from the extension's manifest
    pub version: String,

    /// Install directory
    pub path: Utf8PathBuf,

    /// `None` when the install carries no (readable) metadata
    pub install_metadata: Option<ExtensionInstallMetadata>,
}

impl Extension {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<Utf8PathBuf>,
        install_metadata: Option<ExtensionInstallMetadata>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            path: path.into(),
            install_metadata,
        }
    }

    pub fn install_type(&self) -> Option<InstallType> {
        self.install_metadata.as_ref().map(|m| m.install_type)
    }
}
