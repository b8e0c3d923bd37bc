//! Batch update checks and updates
//!
//! Checks run one extension at a time in input order so remotes are not
//! hit all at once. Updates fan out: every extension with an update
//! available is updated concurrently (optionally bounded), and one failure
//! never cancels its siblings.

use crate::error::Result;
use crate::probe::check_for_update;
use crate::state::{StateStore, TransitionReporter, UpdateState};
use crate::updater::{ExtensionUpdater, UpdateInfo};
use extup_core::Extension;
use extup_git::GitSource;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

/// Runs probes and updates across a set of extensions
pub struct UpdateOrchestrator {
    git: Arc<dyn GitSource>,
    updater: ExtensionUpdater,
    reporter: TransitionReporter,
    max_concurrent_updates: Option<usize>,
}

impl UpdateOrchestrator {
    pub fn new(
        git: Arc<dyn GitSource>,
        updater: ExtensionUpdater,
        reporter: TransitionReporter,
    ) -> Self {
        Self {
            git,
            updater,
            reporter,
            max_concurrent_updates: None,
        }
    }

    /// Bound the number of updates in flight; `None` (or 0) is unbounded
    pub fn with_max_concurrent_updates(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent_updates = limit.filter(|n| *n > 0);
        self
    }

    pub fn store(&self) -> &StateStore {
        self.reporter.store()
    }

    /// Probe every extension that has no recorded state yet
    ///
    /// Runs sequentially in input order; each result is in the store before
    /// the next probe starts.
    pub async fn check_all(&self, extensions: &[Extension]) {
        for extension in extensions {
            if self.store().get(&extension.name).is_some() {
                continue;
            }
            check_for_update(self.git.as_ref(), extension, &self.reporter).await;
        }
    }

    /// Update every extension whose recorded state is `UPDATE_AVAILABLE`
    ///
    /// Returns the successful updates only. Failed updates leave their
    /// extension at `ERROR` with its previous content restored.
    pub async fn update_all(&self, extensions: &[Extension]) -> Vec<UpdateInfo> {
        let candidates: Vec<&Extension> = extensions
            .iter()
            .filter(|e| self.store().get(&e.name) == Some(UpdateState::UpdateAvailable))
            .collect();

        if candidates.is_empty() {
            return Vec::new();
        }
        info!("Updating {} extension(s)", candidates.len());

        let updates = candidates.into_iter().map(|e| self.update_settled(e));
        let settled: Vec<Option<UpdateInfo>> = match self.max_concurrent_updates {
            Some(limit) => stream::iter(updates).buffer_unordered(limit).collect().await,
            None => join_all(updates).await,
        };

        settled.into_iter().flatten().collect()
    }

    /// Update one extension, surfacing its error
    pub async fn update_one(&self, extension: &Extension) -> Result<Option<UpdateInfo>> {
        let current = self.store().get(&extension.name);
        self.updater
            .update(extension, current, &self.reporter)
            .await
    }

    async fn update_settled(&self, extension: &Extension) -> Option<UpdateInfo> {
        match self.update_one(extension).await {
            Ok(info) => info,
            Err(e) => {
                warn!("Update of {} did not complete: {}", extension.name, e);
                None
            }
        }
    }
}
