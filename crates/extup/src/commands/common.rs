//! Shared setup for update commands

use anyhow::{bail, Context, Result};
use camino::Utf8Path;
use extup_core::{Extension, UpdaterConfig};
use extup_git::{GitCli, GitSource};
use extup_update::{
    discover_installed, ExtensionUpdater, FsExtensionInstaller, FsManifestLoader, ManifestLoader,
    StateTransition, TransitionReporter, UpdateOrchestrator, UpdateState,
};
use indicatif::ProgressBar;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::debug;

/// Loaded configuration plus the collaborators built from it
pub(super) struct UpdateContext {
    pub config: UpdaterConfig,
    manifests: Arc<dyn ManifestLoader>,
}

impl UpdateContext {
    pub fn load(config_path: Option<&Utf8Path>) -> Result<Self> {
        let config =
            UpdaterConfig::load(config_path).context("Failed to load updater configuration")?;
        debug!(
            "Extensions directory: {}, manifest file: {}",
            config.extensions_dir, config.manifest_file
        );
        let manifests: Arc<dyn ManifestLoader> =
            Arc::new(FsManifestLoader::new(config.manifest_file.clone()));
        Ok(Self { config, manifests })
    }

    /// Installed extensions, name-sorted
    pub fn installed(&self) -> Result<Vec<Extension>> {
        discover_installed(&self.config.extensions_dir, self.manifests.as_ref()).with_context(
            || {
                format!(
                    "Failed to read extensions directory {}",
                    self.config.extensions_dir
                )
            },
        )
    }

    /// Orchestrator wired to the git CLI and the extensions directory
    pub fn orchestrator(&self, reporter: TransitionReporter) -> Result<UpdateOrchestrator> {
        let git: Arc<dyn GitSource> = Arc::new(
            GitCli::detect(self.config.git_program.clone())
                .context("git is required to check and update extensions")?,
        );

        let installer = Arc::new(FsExtensionInstaller::new(
            self.config.extensions_dir.clone(),
            git.clone(),
            self.manifests.clone(),
        ));

        debug!("Using {} for source operations", self.config.git_program);

        let mut updater = ExtensionUpdater::new(installer, self.manifests.clone())
            .with_backup_prefix(self.config.backup_prefix.clone());
        if let Some(dir) = &self.config.backup_dir {
            updater = updater.with_backup_root(dir.clone());
        }

        Ok(UpdateOrchestrator::new(git, updater, reporter)
            .with_max_concurrent_updates(self.config.max_concurrent_updates))
    }
}

/// Narrow `installed` to `names`, keeping input order of `installed`
///
/// An empty `names` selects everything. Unknown names are an error.
pub(super) fn select(installed: Vec<Extension>, names: &[String]) -> Result<Vec<Extension>> {
    if names.is_empty() {
        return Ok(installed);
    }

    if let Some(missing) = names
        .iter()
        .find(|name| !installed.iter().any(|e| &e.name == *name))
    {
        bail!("Extension '{}' is not installed", missing);
    }

    Ok(installed
        .into_iter()
        .filter(|e| names.contains(&e.name))
        .collect())
}

/// Mirror transitions onto `spinner` until the reporter side is dropped
///
/// Resolves to every transition seen, in order.
pub(super) fn follow_transitions(
    mut rx: UnboundedReceiver<StateTransition>,
    spinner: ProgressBar,
) -> JoinHandle<Vec<StateTransition>> {
    tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(transition) = rx.recv().await {
            match transition.state {
                UpdateState::CheckingForUpdates => {
                    spinner.set_message(format!("Checking {}...", transition.extension));
                }
                UpdateState::Updating => {
                    spinner.set_message(format!("Updating {}...", transition.extension));
                }
                _ => {}
            }
            seen.push(transition);
        }
        seen
    })
}

/// Short human label for a state
pub(super) fn describe(state: Option<UpdateState>) -> &'static str {
    match state {
        None => "unknown",
        Some(UpdateState::NotUpdatable) => "not updatable",
        Some(UpdateState::CheckingForUpdates) => "checking",
        Some(UpdateState::UpToDate) => "up to date",
        Some(UpdateState::UpdateAvailable) => "update available",
        Some(UpdateState::Updating) => "updating",
        Some(UpdateState::UpdatedNeedsRestart) => "updated (restart required)",
        Some(UpdateState::Error) => "error",
    }
}
