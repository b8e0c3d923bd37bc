//! Update state machine, state store, and transition stream
//!
//! Every probe and update reports its progress through a
//! [`TransitionReporter`]. A report writes the extension's entry in the
//! shared [`StateStore`] and pushes a [`StateTransition`] onto an unbounded
//! channel that the caller drains at its own pace. Writers only ever touch
//! their own extension's key; the last write wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tracing::debug;

/// Lifecycle state of one extension's update process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateState {
    /// Install type cannot be re-fetched
    NotUpdatable,
    /// Probe in flight
    CheckingForUpdates,
    /// Local and remote revisions match
    UpToDate,
    /// Remote has a different revision
    UpdateAvailable,
    /// Update in flight
    Updating,
    /// New content installed; the running process must restart to use it
    UpdatedNeedsRestart,
    /// Probe or update failed
    Error,
}

impl UpdateState {
    /// Probe or update still running
    pub fn is_in_flight(self) -> bool {
        matches!(self, UpdateState::CheckingForUpdates | UpdateState::Updating)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_in_flight()
    }

    /// `UPDATING` may be entered from every state except itself
    pub fn can_begin_update(self) -> bool {
        self != UpdateState::Updating
    }
}

impl fmt::Display for UpdateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpdateState::NotUpdatable => "NOT_UPDATABLE",
            UpdateState::CheckingForUpdates => "CHECKING_FOR_UPDATES",
            UpdateState::UpToDate => "UP_TO_DATE",
            UpdateState::UpdateAvailable => "UPDATE_AVAILABLE",
            UpdateState::Updating => "UPDATING",
            UpdateState::UpdatedNeedsRestart => "UPDATED_NEEDS_RESTART",
            UpdateState::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Shared mapping from extension name to its latest update state
///
/// Cloning yields another handle to the same map. An absent entry means the
/// extension has not been probed yet.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    inner: Arc<RwLock<HashMap<String, UpdateState>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<UpdateState> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }

    /// Set `name` to `state`, returning the previous state
    pub fn set(&self, name: &str, state: UpdateState) -> Option<UpdateState> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), state)
    }

    pub fn remove(&self, name: &str) -> Option<UpdateState> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    /// Point-in-time copy of every entry
    pub fn snapshot(&self) -> HashMap<String, UpdateState> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// One reported state change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    /// Unique event ID (UUID v4)
    pub event_id: String,

    /// Report timestamp (UTC)
    pub timestamp: DateTime<Utc>,

    pub extension: String,

    /// State before the report; `None` when never probed
    pub previous: Option<UpdateState>,

    pub state: UpdateState,
}

impl StateTransition {
    pub fn new(extension: &str, previous: Option<UpdateState>, state: UpdateState) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            extension: extension.to_string(),
            previous,
            state,
        }
    }
}

/// Publishes state changes to the store and the transition stream
#[derive(Debug, Clone)]
pub struct TransitionReporter {
    store: StateStore,
    tx: Option<mpsc::UnboundedSender<StateTransition>>,
}

impl TransitionReporter {
    /// Reporter that only writes the store
    pub fn silent(store: StateStore) -> Self {
        Self { store, tx: None }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Record `state` for `extension`
    ///
    /// Never blocks and never fails; a dropped receiver is ignored.
    pub fn report(&self, extension: &str, state: UpdateState) {
        let previous = self.store.set(extension, state);
        debug!(
            "{}: {} -> {}",
            extension,
            previous.map_or_else(|| "-".to_string(), |s| s.to_string()),
            state
        );

        if let Some(tx) = &self.tx {
            let _ = tx.send(StateTransition::new(extension, previous, state));
        }
    }
}

/// Create a reporter over `store` plus the receiving end of its stream
pub fn transition_channel(
    store: StateStore,
) -> (TransitionReporter, mpsc::UnboundedReceiver<StateTransition>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TransitionReporter { store, tx: Some(tx) }, rx)
}
