//! Remote version probe
//!
//! Compares the revision a remote advertises for the tracked ref with the
//! revision currently checked out. The local side is always resolved
//! against `HEAD`: the checkout is assumed to already sit at the tracked ref.

use crate::error::{Error, Result};
use crate::state::{TransitionReporter, UpdateState};
use extup_core::Extension;
use extup_git::{GitSource, HEAD};
use tracing::{debug, info, warn};

/// Determine whether `extension` has an update available
///
/// Reports `CHECKING_FOR_UPDATES` and then exactly one terminal state, which
/// is also returned. Failures never propagate: they are logged and become
/// `ERROR`. Non-remote-tracked installs resolve to `NOT_UPDATABLE` without
/// touching the source adapter.
pub async fn check_for_update(
    git: &dyn GitSource,
    extension: &Extension,
    reporter: &TransitionReporter,
) -> UpdateState {
    reporter.report(&extension.name, UpdateState::CheckingForUpdates);

    let state = match probe(git, extension).await {
        Ok(state) => state,
        Err(e) => {
            warn!("Update check failed for {}: {}", extension.name, e);
            UpdateState::Error
        }
    };

    reporter.report(&extension.name, state);
    state
}

async fn probe(git: &dyn GitSource, extension: &Extension) -> Result<UpdateState> {
    let Some(metadata) = extension
        .install_metadata
        .as_ref()
        .filter(|m| m.install_type.is_remote_tracked())
    else {
        debug!("{} is not remote-tracked", extension.name);
        return Ok(UpdateState::NotUpdatable);
    };

    let remotes = git.list_remotes(&extension.path).await?;
    let Some(remote) = remotes.first() else {
        return Err(Error::no_remote_found(&extension.name));
    };

    let target = metadata.git_ref.as_deref().unwrap_or(HEAD);
    let listing = git.ls_remote(&remote.fetch_url, target).await?;
    if listing.trim().is_empty() {
        return Err(Error::ref_not_found(
            &extension.name,
            &remote.fetch_url,
            target,
        ));
    }

    let remote_hash = parse_listing_hash(&listing)
        .ok_or_else(|| Error::hash_parse_failure(&extension.name, listing.trim()))?;

    let local_hash = git.rev_parse(&extension.path, HEAD).await?;

    if remote_hash == local_hash.trim() {
        debug!("{} is up to date at {}", extension.name, local_hash.trim());
        Ok(UpdateState::UpToDate)
    } else {
        info!(
            "Update available for {}: {} -> {}",
            extension.name,
            local_hash.trim(),
            remote_hash
        );
        Ok(UpdateState::UpdateAvailable)
    }
}

/// Revision identifier of a `"<hash>\t<ref>"` listing
fn parse_listing_hash(listing: &str) -> Option<&str> {
    let hash = listing.split('\t').next().unwrap_or_default().trim();
    (!hash.is_empty()).then_some(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_hash() {
        assert_eq!(parse_listing_hash("abc123\tHEAD\n"), Some("abc123"));
        assert_eq!(
            parse_listing_hash("abc123\trefs/heads/main\ndef456\trefs/heads/dev\n"),
            Some("abc123")
        );
        assert_eq!(parse_listing_hash("\tHEAD"), None);
        assert_eq!(parse_listing_hash("   "), None);
    }

    #[test]
    fn test_parse_listing_without_tab_uses_whole_line() {
        assert_eq!(parse_listing_hash("abc123\n"), Some("abc123"));
    }
}
