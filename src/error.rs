use thiserror::Error;

/// Unified error type for release provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("repository does not exist")]
    RepositoryNotFound,

    #[error("Authentication against remote '{remote}' failed: {message}")]
    Authentication { remote: String, message: String },

    #[error("Git read failed: {0}")]
    GitRead(#[from] git2::Error),

    #[error("Git write failed: {0}")]
    GitWrite(#[source] git2::Error),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("Invalid release name pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Release already exists: tag '{0}'")]
    DuplicateRelease(String),

    #[error("Push to remote '{remote}' failed for {refspecs:?}: {source}")]
    Push {
        remote: String,
        refspecs: Vec<String>,
        #[source]
        source: git2::Error,
    },

    #[error("Fetch from remote '{remote}' failed: {source}")]
    Fetch {
        remote: String,
        #[source]
        source: git2::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in provider-git
pub type Result<T> = std::result::Result<T, ProviderError>;

impl ProviderError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ProviderError::Configuration(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ProviderError::Version(msg.into())
    }

    /// Create an authentication error for a remote
    pub fn auth(remote: impl Into<String>, msg: impl Into<String>) -> Self {
        ProviderError::Authentication {
            remote: remote.into(),
            message: msg.into(),
        }
    }

    /// Whether the caller can retry the failed step on its own.
    ///
    /// Only a failed push qualifies: the local tag already exists, so
    /// retrying the push is enough to finish the release.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProviderError::Push { .. })
    }
}
