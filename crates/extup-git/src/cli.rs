//! `git` command-line implementation of [`GitSource`]

use crate::error::{Error, Result};
use crate::source::{GitSource, Remote};
use async_trait::async_trait;
use camino::Utf8Path;
use tokio::process::Command;
use tracing::{debug, info};

/// Source adapter backed by the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Create an adapter, failing early when `program` is not on PATH
    pub fn detect(program: impl Into<String>) -> Result<Self> {
        let program = program.into();
        which::which(&program).map_err(|_| Error::git_not_found(&program))?;
        Ok(Self::new(program))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run git with `args`, returning stdout on success
    async fn run(&self, cwd: Option<&Utf8Path>, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        // Never block on a credential prompt.
        cmd.env("GIT_TERMINAL_PROMPT", "0").args(args);

        debug!("Running: {} {}", self.program, args.join(" "));
        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::git_not_found(&self.program)
            } else {
                Error::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git_operation(format!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl GitSource for GitCli {
    async fn clone_shallow(&self, remote_url: &str, destination: &Utf8Path) -> Result<()> {
        info!("Cloning repository: {} -> {}", remote_url, destination);
        self.run(
            None,
            &["clone", "--depth", "1", "--", remote_url, destination.as_str()],
        )
        .await?;
        Ok(())
    }

    async fn list_remotes(&self, repo: &Utf8Path) -> Result<Vec<Remote>> {
        let stdout = self.run(Some(repo), &["remote", "-v"]).await?;
        Ok(parse_remote_listing(&stdout))
    }

    async fn fetch(&self, repo: &Utf8Path, remote: &str, git_ref: &str) -> Result<()> {
        let remote = positional(remote)?;
        let git_ref = positional(git_ref)?;
        info!("Fetching {} from remote: {}", git_ref, remote);
        self.run(Some(repo), &["fetch", remote, git_ref])
            .await?;
        Ok(())
    }

    async fn checkout(&self, repo: &Utf8Path, target: &str) -> Result<()> {
        let target = positional(target)?;
        debug!("Checking out {} in {}", target, repo);
        self.run(Some(repo), &["checkout", target]).await?;
        Ok(())
    }

    async fn ls_remote(&self, remote_url: &str, git_ref: &str) -> Result<String> {
        self.run(None, &["ls-remote", "--", remote_url, git_ref]).await
    }

    async fn rev_parse(&self, repo: &Utf8Path, git_ref: &str) -> Result<String> {
        let git_ref = positional(git_ref)?;
        let stdout = self.run(Some(repo), &["rev-parse", git_ref]).await?;
        Ok(stdout.trim().to_string())
    }
}

/// Reject values git would read as options where no `--` separator applies
fn positional(value: &str) -> Result<&str> {
    if value.starts_with('-') {
        return Err(Error::option_like_argument(value));
    }
    Ok(value)
}

/// Parse `git remote -v` output, keeping fetch URLs in listed order
fn parse_remote_listing(output: &str) -> Vec<Remote> {
    let mut remotes: Vec<Remote> = Vec::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }
        if parts.len() >= 3 && parts[2] != "(fetch)" {
            continue;
        }
        if remotes.iter().any(|r| r.name == parts[0]) {
            continue;
        }
        remotes.push(Remote::new(parts[0], parts[1]));
    }

    remotes
}
