//! Mock implementations for testing
//!
//! Provides scripted collaborators so update flows can be exercised without
//! network access or a git binary.

#![allow(dead_code)]

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use extup_core::ExtensionInstallMetadata;
use extup_git::{GitSource, Remote};
use extup_update::{Error, ExtensionInstaller};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Record of a source adapter call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GitCall {
    Clone { url: String, destination: Utf8PathBuf },
    ListRemotes { repo: Utf8PathBuf },
    Fetch { repo: Utf8PathBuf, remote: String, git_ref: String },
    Checkout { repo: Utf8PathBuf, target: String },
    LsRemote { url: String, git_ref: String },
    RevParse { repo: Utf8PathBuf, git_ref: String },
}

/// Source adapter answering from pre-configured tables
#[derive(Default)]
pub struct MockGitSource {
    remotes: Mutex<HashMap<Utf8PathBuf, Vec<Remote>>>,
    listings: Mutex<HashMap<(String, String), String>>,
    local_heads: Mutex<HashMap<Utf8PathBuf, String>>,
    failing_urls: Mutex<Vec<String>>,
    invocations: Mutex<Vec<GitCall>>,
}

impl MockGitSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a remote to the checkout at `repo`
    pub fn with_remote(self, repo: &Utf8Path, name: &str, url: &str) -> Self {
        self.remotes
            .lock()
            .unwrap()
            .entry(repo.to_path_buf())
            .or_default()
            .push(Remote::new(name, url));
        self
    }

    /// Raw `ls-remote` output for `url` and `git_ref`
    pub fn with_listing(self, url: &str, git_ref: &str, listing: &str) -> Self {
        self.listings
            .lock()
            .unwrap()
            .insert((url.to_string(), git_ref.to_string()), listing.to_string());
        self
    }

    /// `rev-parse HEAD` result for the checkout at `repo`
    pub fn with_local_head(self, repo: &Utf8Path, hash: &str) -> Self {
        self.local_heads
            .lock()
            .unwrap()
            .insert(repo.to_path_buf(), hash.to_string());
        self
    }

    /// Make every `ls-remote` against `url` fail like a network error
    pub fn with_unreachable(self, url: &str) -> Self {
        self.failing_urls.lock().unwrap().push(url.to_string());
        self
    }

    pub fn set_listing(&self, url: &str, git_ref: &str, listing: &str) {
        self.listings
            .lock()
            .unwrap()
            .insert((url.to_string(), git_ref.to_string()), listing.to_string());
    }

    pub fn invocations(&self) -> Vec<GitCall> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn ls_remote_refs(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .filter_map(|call| match call {
                GitCall::LsRemote { git_ref, .. } => Some(git_ref),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: GitCall) {
        self.invocations.lock().unwrap().push(call);
    }
}

#[async_trait]
impl GitSource for MockGitSource {
    async fn clone_shallow(&self, remote_url: &str, destination: &Utf8Path) -> extup_git::Result<()> {
        self.record(GitCall::Clone {
            url: remote_url.to_string(),
            destination: destination.to_path_buf(),
        });
        Ok(())
    }

    async fn list_remotes(&self, repo: &Utf8Path) -> extup_git::Result<Vec<Remote>> {
        self.record(GitCall::ListRemotes {
            repo: repo.to_path_buf(),
        });
        Ok(self
            .remotes
            .lock()
            .unwrap()
            .get(repo)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch(&self, repo: &Utf8Path, remote: &str, git_ref: &str) -> extup_git::Result<()> {
        self.record(GitCall::Fetch {
            repo: repo.to_path_buf(),
            remote: remote.to_string(),
            git_ref: git_ref.to_string(),
        });
        Ok(())
    }

    async fn checkout(&self, repo: &Utf8Path, target: &str) -> extup_git::Result<()> {
        self.record(GitCall::Checkout {
            repo: repo.to_path_buf(),
            target: target.to_string(),
        });
        Ok(())
    }

    async fn ls_remote(&self, remote_url: &str, git_ref: &str) -> extup_git::Result<String> {
        self.record(GitCall::LsRemote {
            url: remote_url.to_string(),
            git_ref: git_ref.to_string(),
        });
        // Let sibling tasks interleave if anything runs concurrently.
        tokio::task::yield_now().await;

        if self.failing_urls.lock().unwrap().iter().any(|u| u == remote_url) {
            return Err(extup_git::Error::git_operation(format!(
                "fatal: unable to access '{remote_url}': Could not resolve host"
            )));
        }

        Ok(self
            .listings
            .lock()
            .unwrap()
            .get(&(remote_url.to_string(), git_ref.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn rev_parse(&self, repo: &Utf8Path, git_ref: &str) -> extup_git::Result<String> {
        self.record(GitCall::RevParse {
            repo: repo.to_path_buf(),
            git_ref: git_ref.to_string(),
        });
        self.local_heads
            .lock()
            .unwrap()
            .get(repo)
            .cloned()
            .ok_or_else(|| extup_git::Error::git_operation("fatal: not a git repository"))
    }
}

/// What a scripted install does
#[derive(Clone, Debug)]
pub enum InstallBehavior {
    /// Write a manifest with `version` plus a new file
    Succeed { version: String },
    /// Write a stray file, then fail
    FailAfterPartialWrite { message: String },
    /// Create the directory but no manifest
    WithoutManifest,
    /// Leave a plain file where the directory was, then fail
    ClobberWithFile,
}

#[derive(Clone, Debug)]
struct InstallPlan {
    name: String,
    behavior: InstallBehavior,
}

/// Installer whose behaviour is scripted per install source
pub struct ScriptedInstaller {
    extensions_dir: Utf8PathBuf,
    plans: Mutex<HashMap<String, InstallPlan>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedInstaller {
    pub fn new(extensions_dir: &Utf8Path) -> Self {
        Self {
            extensions_dir: extensions_dir.to_path_buf(),
            plans: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            delay: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Sleep inside every install so concurrent installs overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn plan(self, source: &str, name: &str, behavior: InstallBehavior) -> Self {
        self.plans.lock().unwrap().insert(
            source.to_string(),
            InstallPlan {
                name: name.to_string(),
                behavior,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ExtensionInstaller for ScriptedInstaller {
    async fn install(
        &self,
        metadata: &ExtensionInstallMetadata,
        force_overwrite: bool,
    ) -> extup_update::Result<Utf8PathBuf> {
        self.record(format!("install {} force={}", metadata.source, force_overwrite));

        let plan = self.plans.lock().unwrap().get(&metadata.source).cloned();
        let Some(plan) = plan else {
            return Err(Error::Io(std::io::Error::other(format!(
                "no install plan for {}",
                metadata.source
            ))));
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let dest = self.extensions_dir.join(&plan.name);

        match plan.behavior {
            InstallBehavior::Succeed { version } => {
                std::fs::create_dir_all(&dest)?;
                std::fs::write(
                    dest.join("extension.yaml"),
                    format!("name: {}\nversion: \"{}\"\n", plan.name, version),
                )?;
                std::fs::write(dest.join("CHANGELOG.md"), format!("## {version}\n"))?;
                metadata.save(&dest)?;
                Ok(dest)
            }
            InstallBehavior::FailAfterPartialWrite { message } => {
                std::fs::create_dir_all(&dest)?;
                std::fs::write(dest.join("partial.tmp"), "half-written")?;
                Err(Error::Io(std::io::Error::other(message)))
            }
            InstallBehavior::WithoutManifest => {
                std::fs::create_dir_all(&dest)?;
                Ok(dest)
            }
            InstallBehavior::ClobberWithFile => {
                std::fs::write(&dest, "not a directory")?;
                Err(Error::Io(std::io::Error::other("install interrupted")))
            }
        }
    }

    async fn uninstall(&self, install_dir: &Utf8Path) -> extup_update::Result<()> {
        let name = install_dir.file_name().unwrap_or_default();
        self.record(format!("uninstall {name}"));
        if !install_dir.exists() {
            return Err(Error::not_installed(name));
        }
        std::fs::remove_dir_all(install_dir)?;
        Ok(())
    }
}
