//! Error types for extup-update

use thiserror::Error;

/// Result type alias using extup-update's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Update subsystem error types
#[derive(Error, Debug)]
pub enum Error {
    /// Checkout has no remotes to compare against
    #[error("No remotes found for extension '{name}'")]
    NoRemoteFound { name: String },

    /// Remote returned no listing for the ref being checked
    #[error("Ref '{git_ref}' not found on {remote_url} for extension '{name}'")]
    RefNotFound {
        name: String,
        remote_url: String,
        git_ref: String,
    },

    /// Remote listing had no usable hash
    #[error("Cannot parse revision hash from '{line}' for extension '{name}'")]
    HashParseFailure { name: String, line: String },

    /// Install metadata is missing or unreadable
    #[error("Extension '{name}' has an unknown install type and cannot be updated")]
    UnknownExtensionType { name: String },

    /// Linked extensions follow their working directory
    #[error("Extension is linked so does not need to be updated")]
    LinkNotUpdatable { name: String },

    /// Reinstall finished but no manifest could be loaded
    #[error("Updated extension not found after installation.")]
    PostInstallVerificationFailure { name: String },

    /// Restoring the backup failed after an update error
    #[error("Failed to restore extension '{name}' from backup after update error ({original})")]
    RollbackFailed {
        name: String,
        original: Box<Error>,
        #[source]
        restore: Box<Error>,
    },

    /// Install destination exists and overwrite was not requested
    #[error("Extension '{name}' is already installed at {path}")]
    AlreadyInstalled { name: String, path: String },

    /// Uninstall target does not exist
    #[error("Extension '{name}' is not installed")]
    NotInstalled { name: String },

    /// Directory has no loadable manifest
    #[error("No loadable extension manifest found in {path}")]
    ManifestNotFound { path: String },

    /// Source adapter error
    #[error(transparent)]
    Git(#[from] extup_git::Error),

    /// Core library error
    #[error(transparent)]
    Core(#[from] extup_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a no remote found error
    pub fn no_remote_found(name: impl Into<String>) -> Self {
        Self::NoRemoteFound { name: name.into() }
    }

    /// Create a ref not found error
    pub fn ref_not_found(
        name: impl Into<String>,
        remote_url: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        Self::RefNotFound {
            name: name.into(),
            remote_url: remote_url.into(),
            git_ref: git_ref.into(),
        }
    }

    /// Create a hash parse failure error
    pub fn hash_parse_failure(name: impl Into<String>, line: impl Into<String>) -> Self {
        Self::HashParseFailure {
            name: name.into(),
            line: line.into(),
        }
    }

    /// Create an unknown extension type error
    pub fn unknown_extension_type(name: impl Into<String>) -> Self {
        Self::UnknownExtensionType { name: name.into() }
    }

    /// Create a link not updatable error
    pub fn link_not_updatable(name: impl Into<String>) -> Self {
        Self::LinkNotUpdatable { name: name.into() }
    }

    /// Create a post-install verification failure
    pub fn post_install_verification_failure(name: impl Into<String>) -> Self {
        Self::PostInstallVerificationFailure { name: name.into() }
    }

    /// Create a rollback failure carrying both errors
    pub fn rollback_failed(name: impl Into<String>, original: Error, restore: Error) -> Self {
        Self::RollbackFailed {
            name: name.into(),
            original: Box::new(original),
            restore: Box::new(restore),
        }
    }

    /// Create an already installed error
    pub fn already_installed(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::AlreadyInstalled {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Create a not installed error
    pub fn not_installed(name: impl Into<String>) -> Self {
        Self::NotInstalled { name: name.into() }
    }

    /// Create a manifest not found error
    pub fn manifest_not_found(path: impl Into<String>) -> Self {
        Self::ManifestNotFound { path: path.into() }
    }
}
