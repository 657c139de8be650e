//! Reconciler configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// How long a list-installed snapshot is trusted
    #[serde(with = "serde_duration")]
    pub cache_ttl: Duration,
    #[serde(with = "serde_duration")]
    pub download_timeout: Duration,
    pub max_download_bytes: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),        // 5 minutes
            download_timeout: Duration::from_secs(300), // 5 minutes
            max_download_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {error}")]
    Read {
        path: String,
        #[source]
        error: std::io::Error,
    },

    #[error("Invalid config {path}: {error}")]
    Parse {
        path: String,
        #[source]
        error: serde_yaml::Error,
    },
}

impl ReconcileConfig {
    /// Load from a YAML or JSON file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.display().to_string(),
            error,
        })?;
        serde_yaml::from_str(&contents).map_err(|error| ConfigError::Parse {
            path: path.display().to_string(),
            error,
        })
    }
}

mod serde_duration {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
