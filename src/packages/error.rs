use thiserror::Error;

use crate::exec::CommandError;
use crate::packages::Backend;

/// A list-installed refresh failed; the cache keeps its previous contents
#[derive(Error, Debug)]
pub enum CacheRefreshError {
    #[error("Listing installed {backend} packages failed: {source}")]
    CommandFailed {
        backend: Backend,
        #[source]
        source: CommandError,
    },

    #[error("Backend {backend} has no installed-package listing")]
    Unsupported { backend: Backend },
}

impl CacheRefreshError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CacheRefreshError::CommandFailed { source, .. } if source.is_cancelled())
    }
}
