//! Transactional extension updater
//!
//! An update runs backup -> uninstall -> reinstall -> verify. If anything
//! fails after the installed directory has been touched, the directory is
//! restored from the backup so the extension ends up either fully updated or
//! exactly as it was. The backup workspace is removed on every exit path.

use crate::error::{Error, Result};
use crate::fs::{copy_directory, remove_directory};
use crate::installer::ExtensionInstaller;
use crate::manifest::ManifestLoader;
use crate::state::{TransitionReporter, UpdateState};
use camino::{Utf8Path, Utf8PathBuf};
use extup_core::{Extension, ExtensionInstallMetadata, InstallType};
use serde::Serialize;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

/// Default prefix for backup workspace directories
const DEFAULT_BACKUP_PREFIX: &str = "extup-backup-";

/// Outcome of a completed update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateInfo {
    pub name: String,
    pub original_version: String,
    pub updated_version: String,
}

/// Applies updates to single extensions
#[derive(Clone)]
pub struct ExtensionUpdater {
    installer: Arc<dyn ExtensionInstaller>,
    manifests: Arc<dyn ManifestLoader>,
    backup_prefix: String,
    backup_root: Option<Utf8PathBuf>,
}

impl ExtensionUpdater {
    pub fn new(installer: Arc<dyn ExtensionInstaller>, manifests: Arc<dyn ManifestLoader>) -> Self {
        Self {
            installer,
            manifests,
            backup_prefix: DEFAULT_BACKUP_PREFIX.to_string(),
            backup_root: None,
        }
    }

    pub fn with_backup_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.backup_prefix = prefix.into();
        self
    }

    /// Create backup workspaces under `root` instead of the system temp dir
    pub fn with_backup_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.backup_root = Some(root.into());
        self
    }

    /// Update `extension` to the newest content of its source
    ///
    /// Returns `Ok(None)` without doing anything when `current` is already
    /// `UPDATING`. Errors are reported as `ERROR` and returned after the
    /// installed directory has been restored.
    pub async fn update(
        &self,
        extension: &Extension,
        current: Option<UpdateState>,
        reporter: &TransitionReporter,
    ) -> Result<Option<UpdateInfo>> {
        if current.is_some_and(|state| !state.can_begin_update()) {
            debug!("{} is already updating", extension.name);
            return Ok(None);
        }

        let Some(metadata) = extension.install_metadata.as_ref() else {
            reporter.report(&extension.name, UpdateState::Error);
            return Err(Error::unknown_extension_type(&extension.name));
        };

        if metadata.install_type == InstallType::Link {
            reporter.report(&extension.name, UpdateState::NotUpdatable);
            return Err(Error::link_not_updatable(&extension.name));
        }

        reporter.report(&extension.name, UpdateState::Updating);
        info!("Updating extension: {}", extension.name);

        let backup = match self.create_backup(&extension.path).await {
            Ok(backup) => backup,
            Err(e) => {
                // Nothing has been removed yet; the install is intact.
                error!("Failed to back up {}: {}", extension.name, e);
                reporter.report(&extension.name, UpdateState::Error);
                return Err(e);
            }
        };

        let result = self.replace(extension, metadata).await;

        let outcome = match result {
            Ok(updated_version) => {
                reporter.report(&extension.name, UpdateState::UpdatedNeedsRestart);
                info!(
                    "Updated {} {} -> {}",
                    extension.name, extension.version, updated_version
                );
                Ok(Some(UpdateInfo {
                    name: extension.name.clone(),
                    original_version: extension.version.clone(),
                    updated_version,
                }))
            }
            Err(e) => {
                error!("Update of {} failed: {}", extension.name, e);
                reporter.report(&extension.name, UpdateState::Error);
                match self.restore(&backup, &extension.path).await {
                    Ok(()) => Err(e),
                    Err(restore_err) => {
                        error!(
                            "Restoring {} from backup failed: {}",
                            extension.name, restore_err
                        );
                        Err(Error::rollback_failed(&extension.name, e, restore_err))
                    }
                }
            }
        };

        discard_backup(backup);
        outcome
    }

    /// Remove the installed directory, reinstall, and reload the manifest
    ///
    /// Returns the new version. Removal targets `extension.path`, the same
    /// directory that was backed up, which need not match the manifest name.
    async fn replace(
        &self,
        extension: &Extension,
        metadata: &ExtensionInstallMetadata,
    ) -> Result<String> {
        self.installer.uninstall(&extension.path).await?;

        let installed = self.installer.install(metadata, true).await?;

        let manifest = self
            .manifests
            .load(&installed)
            .ok_or_else(|| Error::post_install_verification_failure(&extension.name))?;

        Ok(manifest.version)
    }

    async fn create_backup(&self, install_path: &Utf8Path) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.backup_prefix);
        let backup = match &self.backup_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        let backup_path = utf8_path(&backup)?;
        debug!("Backing up {} to {}", install_path, backup_path);
        copy_directory(install_path, backup_path).await?;
        Ok(backup)
    }

    async fn restore(&self, backup: &TempDir, install_path: &Utf8Path) -> Result<()> {
        warn!("Restoring {} from backup", install_path);
        remove_directory(install_path).await?;
        copy_directory(utf8_path(backup)?, install_path).await?;
        info!("Restored {} from backup", install_path);
        Ok(())
    }
}

fn utf8_path(dir: &TempDir) -> Result<&Utf8Path> {
    Utf8Path::from_path(dir.path()).ok_or_else(|| {
        extup_core::Error::non_utf8_path(dir.path().display().to_string()).into()
    })
}

/// Delete the backup workspace, logging instead of failing
fn discard_backup(backup: TempDir) {
    let path = backup.path().display().to_string();
    if let Err(e) = backup.close() {
        warn!("Failed to remove backup workspace {}: {}", path, e);
    }
}
