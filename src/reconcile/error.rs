use thiserror::Error;

use crate::exec::CommandError;
use crate::packages::{Backend, CacheRefreshError};
use crate::resource::DesiredState;

/// The descriptor cannot be turned into a managed package
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Package resource does not name a package manager")]
    Blank,

    #[error("Desired state {state} is not supported by the {backend} backend")]
    UnsupportedState {
        backend: Backend,
        state: DesiredState,
    },

    #[error("Package name for the {backend} backend must not be empty")]
    EmptyName { backend: Backend },

    #[error("Source {path} is not accessible: {error}")]
    SourceUnreadable {
        path: String,
        #[source]
        error: std::io::Error,
    },

    #[error("Source {path} is not a regular file")]
    SourceNotAFile { path: String },

    #[error("Source path {path} is not valid UTF-8")]
    SourceNotUtf8 { path: String },

    #[error("Unsupported source URI scheme {scheme:?} in {uri}")]
    UnsupportedScheme { uri: String, scheme: String },

    #[error("Failed to download {uri}: {error}")]
    Download { uri: String, error: String },

    #[error("Download of {uri} was cancelled")]
    Cancelled { uri: String },

    #[error("Download of {uri} exceeds the {limit} byte limit")]
    DownloadTooLarge { uri: String, limit: u64 },

    #[error("Checksum mismatch for {uri}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        uri: String,
        expected: String,
        actual: String,
    },
}

/// The install or remove command failed
#[derive(Error, Debug)]
pub enum EnforcementError {
    #[error("Enforcing {backend} package {target} failed: {source}")]
    CommandFailed {
        backend: Backend,
        target: String,
        #[source]
        source: CommandError,
    },

    #[error("Desired state {state} cannot be enforced by the {backend} backend")]
    Unsupported {
        backend: Backend,
        state: DesiredState,
    },
}

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Package resource has not been validated")]
    NotValidated,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Cache refresh error: {0}")]
    CacheRefresh(#[from] CacheRefreshError),

    #[error("Enforcement error: {0}")]
    Enforcement(#[from] EnforcementError),
}

impl ResourceError {
    /// Cancellation is not a command failure and should not be retried as one.
    pub fn is_cancelled(&self) -> bool {
        match self {
            ResourceError::Validation(ValidationError::Cancelled { .. }) => true,
            ResourceError::CacheRefresh(err) => err.is_cancelled(),
            ResourceError::Enforcement(EnforcementError::CommandFailed { source, .. }) => {
                source.is_cancelled()
            }
            _ => false,
        }
    }
}
