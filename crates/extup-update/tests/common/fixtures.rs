//! Workspace fixtures for update tests

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use extup_core::{Extension, ExtensionInstallMetadata, InstallType};
use extup_update::{StateTransition, UpdateState};
use std::collections::BTreeMap;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use walkdir::WalkDir;

/// Temporary root holding an extensions directory and a backup root
pub struct Workspace {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp workspace");
        let root = Utf8Path::from_path(temp.path())
            .expect("utf-8 temp path")
            .to_path_buf();
        std::fs::create_dir_all(root.join("extensions")).unwrap();
        std::fs::create_dir_all(root.join("backups")).unwrap();
        Self { _temp: temp, root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn extensions_dir(&self) -> Utf8PathBuf {
        self.root.join("extensions")
    }

    pub fn backups_dir(&self) -> Utf8PathBuf {
        self.root.join("backups")
    }

    /// Install a fake extension with a manifest, hidden files, and nested content
    pub fn install(
        &self,
        name: &str,
        version: &str,
        metadata: Option<ExtensionInstallMetadata>,
    ) -> Extension {
        let dir = self.extensions_dir().join(name);
        std::fs::create_dir_all(dir.join("src")).unwrap();
        std::fs::create_dir_all(dir.join(".cache")).unwrap();
        std::fs::write(
            dir.join("extension.yaml"),
            format!("name: {name}\nversion: \"{version}\"\n"),
        )
        .unwrap();
        std::fs::write(dir.join(".env"), format!("{}_TOKEN=secret\n", name.to_uppercase())).unwrap();
        std::fs::write(dir.join(".cache/index"), [0u8, 159, 146, 150]).unwrap();
        std::fs::write(dir.join("src/main.js"), format!("// {name} {version}\n")).unwrap();
        if let Some(metadata) = &metadata {
            metadata.save(&dir).unwrap();
        }
        Extension::new(name, version, dir, metadata)
    }

    /// Installed git extension tracking `url` (and optionally `git_ref`)
    pub fn install_git(&self, name: &str, version: &str, url: &str, git_ref: Option<&str>) -> Extension {
        let mut metadata = ExtensionInstallMetadata::new(InstallType::Git, url);
        if let Some(git_ref) = git_ref {
            metadata = metadata.with_ref(git_ref);
        }
        self.install(name, version, Some(metadata))
    }
}

/// Every file under `dir` keyed by relative path
pub fn snapshot_dir(dir: &Utf8Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .map(|entry| entry.expect("walk directory"))
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry
                .path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .into_owned();
            let contents = std::fs::read(entry.path()).unwrap();
            (relative, contents)
        })
        .collect()
}

/// Number of entries directly inside `dir`
pub fn entry_count(dir: &Utf8Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// Transitions received so far, as `(extension, state)` pairs
pub fn drain(rx: &mut UnboundedReceiver<StateTransition>) -> Vec<(String, UpdateState)> {
    let mut seen = Vec::new();
    while let Ok(transition) = rx.try_recv() {
        seen.push((transition.extension, transition.state));
    }
    seen
}

/// Transitions received so far for `name`
pub fn states_for(transitions: &[(String, UpdateState)], name: &str) -> Vec<UpdateState> {
    transitions
        .iter()
        .filter(|(ext, _)| ext == name)
        .map(|(_, state)| *state)
        .collect()
}
