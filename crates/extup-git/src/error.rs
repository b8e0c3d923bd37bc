//! Error types for extup-git

use thiserror::Error;

/// Result type alias using extup-git's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Source adapter error types
#[derive(Error, Debug)]
pub enum Error {
    /// A git command exited unsuccessfully
    #[error("Git operation failed: {message}")]
    GitOperation { message: String },

    /// The git program could not be found
    #[error("Git command not found: {program}. Please ensure git is installed and in PATH")]
    GitNotFound { program: String },

    /// A ref, remote, or target would be parsed by git as an option
    #[error("Refusing to pass option-like argument to git: {value}")]
    OptionLikeArgument { value: String },

    /// Repository has no remotes
    #[error("No remotes found in repository: {path}")]
    NoRemotes { path: String },

    /// Clone-and-checkout failed; the user-facing message hides the cause,
    /// which stays reachable through `source()`
    #[error("Failed to clone Git repository from {source_url}")]
    CloneFailed {
        source_url: String,
        #[source]
        cause: Box<Error>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a git operation error
    pub fn git_operation(message: impl Into<String>) -> Self {
        Self::GitOperation {
            message: message.into(),
        }
    }

    /// Create a git not found error
    pub fn git_not_found(program: impl Into<String>) -> Self {
        Self::GitNotFound {
            program: program.into(),
        }
    }

    /// Create an option-like argument error
    pub fn option_like_argument(value: impl Into<String>) -> Self {
        Self::OptionLikeArgument {
            value: value.into(),
        }
    }

    /// Create a no remotes error
    pub fn no_remotes(path: impl Into<String>) -> Self {
        Self::NoRemotes { path: path.into() }
    }

    /// Create a clone failed error wrapping its cause
    pub fn clone_failed(source_url: impl Into<String>, cause: Error) -> Self {
        Self::CloneFailed {
            source_url: source_url.into(),
            cause: Box::new(cause),
        }
    }
}
