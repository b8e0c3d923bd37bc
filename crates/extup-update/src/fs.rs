//! Directory copy and removal helpers

use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Copy the contents of `from` into `to`, byte for byte
///
/// Hidden files are included and symlinks are recreated as symlinks on
/// unix. `to` is created if missing. Runs on a blocking thread.
pub async fn copy_directory(from: &Utf8Path, to: &Utf8Path) -> Result<()> {
    let (from, to): (Utf8PathBuf, Utf8PathBuf) = (from.to_owned(), to.to_owned());
    debug!("Copying directory {} -> {}", from, to);

    tokio::task::spawn_blocking(move || copy_tree(from.as_std_path(), to.as_std_path()))
        .await
        .map_err(io::Error::other)??;
    Ok(())
}

/// Remove `path` and everything below it; missing paths are fine
pub async fn remove_directory(path: &Utf8Path) -> Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    std::fs::create_dir_all(to)?;

    for entry in WalkDir::new(from).min_depth(1).follow_links(false) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        let target = to.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, target: &Path) -> io::Result<()> {
    let link = std::fs::read_link(src)?;
    if target.symlink_metadata().is_ok() {
        std::fs::remove_file(target)?;
    }
    std::os::unix::fs::symlink(link, target)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, target: &Path) -> io::Result<()> {
    std::fs::copy(src, target).map(|_| ())
}
