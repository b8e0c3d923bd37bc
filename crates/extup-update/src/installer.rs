//! Extension install and uninstall
//!
//! Remote-tracked extensions (`git`, `github-release`) are cloned into a
//! staging directory next to the final location and moved into place once
//! their manifest has been read. `local` installs copy the source directory;
//! `link` installs only record metadata and keep reading the source.

use crate::error::{Error, Result};
use crate::fs::{copy_directory, remove_directory};
use crate::manifest::ManifestLoader;
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use extup_core::{ExtensionInstallMetadata, InstallType};
use extup_git::{clone_and_checkout, GitSource};
use std::sync::Arc;
use tracing::{debug, info};

/// Prefix for staging directories inside the extensions directory
const STAGING_PREFIX: &str = ".staging-";

/// Installs and removes extensions
#[async_trait]
pub trait ExtensionInstaller: Send + Sync {
    /// Install from `metadata`, returning the installed directory
    ///
    /// With `force_overwrite`, an existing install of the same name is
    /// replaced instead of rejected.
    async fn install(
        &self,
        metadata: &ExtensionInstallMetadata,
        force_overwrite: bool,
    ) -> Result<Utf8PathBuf>;

    /// Remove the extension installed at `install_dir`
    async fn uninstall(&self, install_dir: &Utf8Path) -> Result<()>;
}

/// Installer managing one directory per extension under `extensions_dir`
pub struct FsExtensionInstaller {
    extensions_dir: Utf8PathBuf,
    git: Arc<dyn GitSource>,
    manifests: Arc<dyn ManifestLoader>,
}

impl FsExtensionInstaller {
    pub fn new(
        extensions_dir: impl Into<Utf8PathBuf>,
        git: Arc<dyn GitSource>,
        manifests: Arc<dyn ManifestLoader>,
    ) -> Self {
        Self {
            extensions_dir: extensions_dir.into(),
            git,
            manifests,
        }
    }

    pub fn extensions_dir(&self) -> &Utf8Path {
        &self.extensions_dir
    }

    /// Directory an extension named `name` is installed into
    pub fn install_dir(&self, name: &str) -> Utf8PathBuf {
        self.extensions_dir.join(name)
    }

    fn manifest_name(&self, dir: &Utf8Path) -> Result<String> {
        self.manifests
            .load(dir)
            .map(|m| m.name)
            .ok_or_else(|| Error::manifest_not_found(dir.as_str()))
    }

    /// Clear `dest` for a new install, honouring `force_overwrite`
    async fn prepare_destination(
        &self,
        name: &str,
        dest: &Utf8Path,
        force_overwrite: bool,
    ) -> Result<()> {
        if dest.exists() {
            if !force_overwrite {
                return Err(Error::already_installed(name, dest.as_str()));
            }
            debug!("Overwriting existing install at {}", dest);
            remove_directory(dest).await?;
        }
        Ok(())
    }

    async fn install_remote(
        &self,
        metadata: &ExtensionInstallMetadata,
        force_overwrite: bool,
    ) -> Result<Utf8PathBuf> {
        tokio::fs::create_dir_all(&self.extensions_dir).await?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.extensions_dir)?;
        let staging_root = Utf8Path::from_path(staging.path())
            .ok_or_else(|| extup_core::Error::non_utf8_path(staging.path().display().to_string()))?;
        let checkout = staging_root.join("checkout");

        clone_and_checkout(
            self.git.as_ref(),
            &metadata.source,
            metadata.git_ref.as_deref(),
            &checkout,
        )
        .await?;

        let name = self.manifest_name(&checkout)?;
        let dest = self.install_dir(&name);
        self.prepare_destination(&name, &dest, force_overwrite)
            .await?;

        tokio::fs::rename(&checkout, &dest).await?;
        Ok(dest)
    }

    async fn install_local(
        &self,
        metadata: &ExtensionInstallMetadata,
        force_overwrite: bool,
    ) -> Result<Utf8PathBuf> {
        let source = Utf8Path::new(&metadata.source);
        let name = self.manifest_name(source)?;
        let dest = self.install_dir(&name);
        self.prepare_destination(&name, &dest, force_overwrite)
            .await?;

        copy_directory(source, &dest).await?;
        Ok(dest)
    }

    async fn install_link(
        &self,
        metadata: &ExtensionInstallMetadata,
        force_overwrite: bool,
    ) -> Result<Utf8PathBuf> {
        let source = Utf8Path::new(&metadata.source);
        let name = self.manifest_name(source)?;
        let dest = self.install_dir(&name);
        self.prepare_destination(&name, &dest, force_overwrite)
            .await?;

        tokio::fs::create_dir_all(&dest).await?;
        Ok(dest)
    }
}

#[async_trait]
impl ExtensionInstaller for FsExtensionInstaller {
    async fn install(
        &self,
        metadata: &ExtensionInstallMetadata,
        force_overwrite: bool,
    ) -> Result<Utf8PathBuf> {
        info!(
            "Installing {} extension from {}",
            metadata.install_type, metadata.source
        );

        let dest = match metadata.install_type {
            InstallType::Git | InstallType::GithubRelease => {
                self.install_remote(metadata, force_overwrite).await?
            }
            InstallType::Local => self.install_local(metadata, force_overwrite).await?,
            InstallType::Link => self.install_link(metadata, force_overwrite).await?,
        };

        metadata.save(&dest)?;
        info!("Installed extension at {}", dest);
        Ok(dest)
    }

    async fn uninstall(&self, install_dir: &Utf8Path) -> Result<()> {
        if !install_dir.is_dir() {
            return Err(Error::not_installed(
                install_dir.file_name().unwrap_or(install_dir.as_str()),
            ));
        }

        info!("Uninstalling extension at {}", install_dir);
        remove_directory(install_dir).await
    }
}
