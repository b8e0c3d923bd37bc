//! Enumerate installed extensions

use crate::error::Result;
use crate::manifest::ManifestLoader;
use camino::{Utf8Path, Utf8PathBuf};
use extup_core::{Extension, ExtensionInstallMetadata, InstallType};
use tracing::{debug, warn};

/// Build the runtime view of every extension under `extensions_dir`
///
/// Directories without install metadata or hidden directories are skipped.
/// Unreadable metadata still yields an extension, with
/// `install_metadata: None`. Results are sorted by name.
pub fn discover_installed(
    extensions_dir: &Utf8Path,
    manifests: &dyn ManifestLoader,
) -> Result<Vec<Extension>> {
    if !extensions_dir.exists() {
        debug!("Extensions directory {} does not exist", extensions_dir);
        return Ok(Vec::new());
    }

    let mut extensions = Vec::new();

    for entry in extensions_dir.read_dir_utf8()? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() || entry.file_name().starts_with('.') {
            continue;
        }
        let dir = entry.path().to_path_buf();

        let metadata = match ExtensionInstallMetadata::load(&dir) {
            Ok(Some(metadata)) => Some(metadata),
            Ok(None) => continue,
            Err(e) => {
                warn!("Ignoring install metadata in {}: {}", dir, e);
                None
            }
        };

        let content_dir = match &metadata {
            Some(m) if m.install_type == InstallType::Link => Utf8PathBuf::from(&m.source),
            _ => dir.clone(),
        };

        let Some(manifest) = manifests.load(&content_dir) else {
            warn!("Skipping {}: no loadable manifest", content_dir);
            continue;
        };

        extensions.push(Extension::new(
            manifest.name,
            manifest.version,
            content_dir,
            metadata,
        ));
    }

    extensions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(extensions)
}
