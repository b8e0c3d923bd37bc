//! Extension manifest loading

use camino::Utf8Path;
use extup_core::types::DEFAULT_MANIFEST_FILE;
use extup_core::ExtensionManifest;
use tracing::debug;

/// Reads an extension's manifest from its directory
pub trait ManifestLoader: Send + Sync {
    /// `None` when no loadable manifest exists at `dir`
    fn load(&self, dir: &Utf8Path) -> Option<ExtensionManifest>;
}

/// Loads `<dir>/<manifest_file>` as YAML
#[derive(Debug, Clone)]
pub struct FsManifestLoader {
    manifest_file: String,
}

impl Default for FsManifestLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_FILE)
    }
}

impl FsManifestLoader {
    pub fn new(manifest_file: impl Into<String>) -> Self {
        Self {
            manifest_file: manifest_file.into(),
        }
    }

    pub fn manifest_file(&self) -> &str {
        &self.manifest_file
    }
}

impl ManifestLoader for FsManifestLoader {
    fn load(&self, dir: &Utf8Path) -> Option<ExtensionManifest> {
        let path = dir.join(&self.manifest_file);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No manifest at {}: {}", path, e);
                return None;
            }
        };

        match serde_yaml_ng::from_str(&content) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                debug!("Unparsable manifest at {}: {}", path, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_present_manifest() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        std::fs::write(
            dir.join("extension.yaml"),
            "name: weather\nversion: \"2.0\"\n",
        )
        .unwrap();

        let manifest = FsManifestLoader::default().load(dir).unwrap();
        assert_eq!(manifest.name, "weather");
        assert_eq!(manifest.version, "2.0");
    }

    #[test]
    fn test_missing_or_broken_manifest_is_absent() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        let loader = FsManifestLoader::default();

        assert!(loader.load(dir).is_none());

        std::fs::write(dir.join("extension.yaml"), "version: [unclosed").unwrap();
        assert!(loader.load(dir).is_none());
    }

    #[test]
    fn test_custom_manifest_file_name() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        std::fs::write(dir.join("plugin.yml"), "name: p\nversion: \"1\"\n").unwrap();

        let loader = FsManifestLoader::new("plugin.yml");
        assert_eq!(loader.manifest_file(), "plugin.yml");
        assert!(loader.load(dir).is_some());
        assert!(FsManifestLoader::default().load(dir).is_none());
    }
}
