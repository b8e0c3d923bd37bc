//! Clone-and-checkout composite used when installing remote-tracked extensions

use crate::error::{Error, Result};
use crate::source::{GitSource, FETCH_HEAD, HEAD};
use camino::Utf8Path;
use tracing::{info, warn};

/// Clone `source` into `destination` and check out `git_ref` (or `HEAD`)
///
/// Steps: shallow clone, list remotes, fetch the ref from the first remote,
/// check out `FETCH_HEAD`. Any failure is reported as
/// [`Error::CloneFailed`] with the underlying error kept as its source.
pub async fn clone_and_checkout(
    git: &dyn GitSource,
    source: &str,
    git_ref: Option<&str>,
    destination: &Utf8Path,
) -> Result<()> {
    match clone_steps(git, source, git_ref, destination).await {
        Ok(()) => {
            info!("Checked out {} from {}", git_ref.unwrap_or(HEAD), source);
            Ok(())
        }
        Err(e) => {
            warn!("Clone of {} failed: {}", source, e);
            Err(Error::clone_failed(source, e))
        }
    }
}

async fn clone_steps(
    git: &dyn GitSource,
    source: &str,
    git_ref: Option<&str>,
    destination: &Utf8Path,
) -> Result<()> {
    git.clone_shallow(source, destination).await?;

    let remotes = git.list_remotes(destination).await?;
    let remote = remotes
        .first()
        .ok_or_else(|| Error::no_remotes(destination.as_str()))?;

    git.fetch(destination, &remote.name, git_ref.unwrap_or(HEAD))
        .await?;
    git.checkout(destination, FETCH_HEAD).await
}
