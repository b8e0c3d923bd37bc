//! Updater configuration loading

use crate::error::{Error, Result};
use crate::types::DEFAULT_MANIFEST_FILE;
use crate::utils::get_extup_home;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::debug;

/// Configuration file name inside the extup home directory
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Default prefix for backup workspace directories
const DEFAULT_BACKUP_PREFIX: &str = "extup-backup-";

/// Settings for probing and updating installed extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Directory holding one subdirectory per installed extension
    pub extensions_dir: Utf8PathBuf,

    /// Manifest file name inside each extension directory
    pub manifest_file: String,

    /// Upper bound on concurrent updates; `None` runs every update at once
    pub max_concurrent_updates: Option<usize>,

    /// Program used for version-control operations
    pub git_program: String,

    /// Name prefix for backup workspace directories
    pub backup_prefix: String,

    /// Parent directory for backup workspaces; the system temp dir when unset
    pub backup_dir: Option<Utf8PathBuf>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        let extensions_dir = get_extup_home()
            .map(|home| home.join("extensions"))
            .unwrap_or_else(|_| Utf8PathBuf::from(".extup/extensions"));

        Self {
            extensions_dir,
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            max_concurrent_updates: None,
            git_program: "git".to_string(),
            backup_prefix: DEFAULT_BACKUP_PREFIX.to_string(),
            backup_dir: None,
        }
    }
}

impl UpdaterConfig {
    /// Load configuration
    ///
    /// Priority:
    /// 1. Explicit path (must exist)
    /// 2. `$EXTUP_HOME/config.yaml` or `~/.extup/config.yaml`
    /// 3. Defaults
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        if let Some(p) = path {
            let content = fs::read_to_string(p).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::config_not_found(p.as_str())
                } else {
                    Error::Io(e)
                }
            })?;
            return Self::from_yaml(&content);
        }

        let default_path = get_extup_home()?.join(CONFIG_FILE_NAME);
        if default_path.exists() {
            debug!("Loading updater config from {}", default_path);
            let content = fs::read_to_string(&default_path)?;
            return Self::from_yaml(&content);
        }

        debug!("Using default updater configuration");
        Ok(Self::default())
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_concurrent_updates == Some(0) {
            return Err(Error::invalid_config(
                "max_concurrent_updates must be at least 1",
            ));
        }
        if self.manifest_file.trim().is_empty() {
            return Err(Error::invalid_config("manifest_file must not be empty"));
        }
        if self.git_program.trim().is_empty() {
            return Err(Error::invalid_config("git_program must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = UpdaterConfig::default();
        assert_eq!(config.manifest_file, "extension.yaml");
        assert_eq!(config.git_program, "git");
        assert!(config.max_concurrent_updates.is_none());
        assert!(config.backup_dir.is_none());
        assert!(config.extensions_dir.ends_with("extensions"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = UpdaterConfig::from_yaml(
            "extensions_dir: /srv/extensions\nmax_concurrent_updates: 4\n",
        )
        .unwrap();

        assert_eq!(config.extensions_dir, "/srv/extensions");
        assert_eq!(config.max_concurrent_updates, Some(4));
        assert_eq!(config.manifest_file, "extension.yaml");
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = UpdaterConfig::from_yaml("max_concurrent_updates: 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_explicit_missing_path() {
        let err = UpdaterConfig::load(Some(Utf8Path::new("/nonexistent/extup.yaml"))).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    #[serial]
    fn test_load_from_extup_home() {
        let temp = TempDir::new().unwrap();
        let home = Utf8Path::from_path(temp.path()).unwrap();
        fs::write(home.join("config.yaml"), "git_program: /usr/local/bin/git\n").unwrap();

        let previous = std::env::var("EXTUP_HOME").ok();
        std::env::set_var("EXTUP_HOME", home.as_str());

        let config = UpdaterConfig::load(None).unwrap();
        assert_eq!(config.git_program, "/usr/local/bin/git");
        assert_eq!(config.extensions_dir, home.join("extensions"));

        match previous {
            Some(v) => std::env::set_var("EXTUP_HOME", v),
            None => std::env::remove_var("EXTUP_HOME"),
        }
    }
}
