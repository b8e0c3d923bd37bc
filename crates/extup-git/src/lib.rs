//! # extup-git
//!
//! Version-control source adapter used by the extension update subsystem:
//! - Shallow clone of a remote into an empty directory
//! - Remote listing, single-ref fetch, and checkout
//! - Remote and local revision queries (`ls-remote`, `rev-parse`)
//! - The clone-and-checkout composite used at install time
//!
//! All operations go through the [`GitSource`] trait so callers can swap the
//! `git` CLI implementation for a scripted one in tests.
//!
//! # Example
//!
//! ```no_run
//! use extup_git::{GitCli, GitSource, HEAD};
//! use camino::Utf8Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let git = GitCli::default();
//! let repo = Utf8Path::new("/home/me/.extup/extensions/weather");
//! let remotes = git.list_remotes(repo).await?;
//! let line = git.ls_remote(&remotes[0].fetch_url, HEAD).await?;
//! let local = git.rev_parse(repo, HEAD).await?;
//! println!("{line} vs {local}");
//! # Ok(())
//! # }
//! ```

mod cli;
mod composite;
mod error;
mod source;

pub use cli::GitCli;
pub use composite::clone_and_checkout;
pub use error::{Error, Result};
pub use source::{GitSource, Remote, FETCH_HEAD, HEAD};
