//! Source adapter trait

use crate::error::Result;
use async_trait::async_trait;
use camino::Utf8Path;

/// Symbolic ref for the default branch tip
pub const HEAD: &str = "HEAD";

/// Ref written by `fetch`, checked out afterwards
pub const FETCH_HEAD: &str = "FETCH_HEAD";

/// A named remote of a local checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub fetch_url: String,
}

impl Remote {
    pub fn new(name: impl Into<String>, fetch_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fetch_url: fetch_url.into(),
        }
    }
}

/// Request/response operations against one remote-tracked source
///
/// Implementations hold no per-repository state; every call names the
/// checkout path or remote URL it acts on.
#[async_trait]
pub trait GitSource: Send + Sync {
    /// Shallow clone (depth 1) of `remote_url` into an empty `destination`
    async fn clone_shallow(&self, remote_url: &str, destination: &Utf8Path) -> Result<()>;

    /// Remotes of the checkout at `repo`, in the order the tool reports them
    async fn list_remotes(&self, repo: &Utf8Path) -> Result<Vec<Remote>>;

    /// Fetch one ref from one named remote without merging
    async fn fetch(&self, repo: &Utf8Path, remote: &str, git_ref: &str) -> Result<()>;

    /// Move the working tree to `target`
    async fn checkout(&self, repo: &Utf8Path, target: &str) -> Result<()>;

    /// Query a remote without a local checkout
    ///
    /// Returns the raw `"<hash>\t<ref>"` listing, or an empty string when
    /// the ref does not exist.
    async fn ls_remote(&self, remote_url: &str, git_ref: &str) -> Result<String>;

    /// Resolve a local ref to its revision identifier
    async fn rev_parse(&self, repo: &Utf8Path, git_ref: &str) -> Result<String>;
}
