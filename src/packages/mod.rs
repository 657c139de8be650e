//! Package manager backends: command table, installed-package parsers and
//! the per-backend installed cache

pub mod apt;
pub mod cache;
pub mod error;
pub mod googet;
pub mod rpm;
pub mod table;

pub use cache::{InstalledCache, InstalledCaches};
pub use error::CacheRefreshError;
pub use table::{ArgTemplate, BackendDescriptor, ListInstalled};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A package manager or installer format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Apt,
    Deb,
    GooGet,
    Msi,
    Yum,
    Zypper,
    Rpm,
}

impl Backend {
    pub const ALL: [Backend; 7] = [
        Backend::Apt,
        Backend::Deb,
        Backend::GooGet,
        Backend::Msi,
        Backend::Yum,
        Backend::Zypper,
        Backend::Rpm,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Apt => "apt",
            Backend::Deb => "deb",
            Backend::GooGet => "googet",
            Backend::Msi => "msi",
            Backend::Yum => "yum",
            Backend::Zypper => "zypper",
            Backend::Rpm => "rpm",
        }
    }

    /// Name-based backends identify packages by name and can remove them.
    /// The rest install from an artifact and have no installed-name cache.
    pub fn is_name_based(&self) -> bool {
        matches!(
            self,
            Backend::Apt | Backend::GooGet | Backend::Yum | Backend::Zypper
        )
    }

    pub fn descriptor(&self) -> &'static BackendDescriptor {
        table::descriptor(*self)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
