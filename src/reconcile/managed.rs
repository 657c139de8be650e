//! Validated, backend-tagged package representation

use serde::Serialize;
use std::path::PathBuf;

use crate::packages::Backend;
use crate::resource::DesiredState;

/// A package identified by name, installable and removable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedPackage {
    pub desired_state: DesiredState,
    pub name: String,
}

impl NamedPackage {
    pub fn new(desired_state: DesiredState, name: impl Into<String>) -> Self {
        Self {
            desired_state,
            name: name.into(),
        }
    }
}

/// A package installed from a local artifact. The desired state is always
/// installed: there is no name to remove it by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcePackage {
    pub source: PathBuf,
}

impl SourcePackage {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagedPackage {
    Apt(NamedPackage),
    Deb(SourcePackage),
    GooGet(NamedPackage),
    Msi(SourcePackage),
    Yum(NamedPackage),
    Zypper(NamedPackage),
    Rpm(SourcePackage),
}

impl ManagedPackage {
    pub fn backend(&self) -> Backend {
        match self {
            ManagedPackage::Apt(_) => Backend::Apt,
            ManagedPackage::Deb(_) => Backend::Deb,
            ManagedPackage::GooGet(_) => Backend::GooGet,
            ManagedPackage::Msi(_) => Backend::Msi,
            ManagedPackage::Yum(_) => Backend::Yum,
            ManagedPackage::Zypper(_) => Backend::Zypper,
            ManagedPackage::Rpm(_) => Backend::Rpm,
        }
    }

    pub fn desired_state(&self) -> DesiredState {
        match self {
            ManagedPackage::Apt(p)
            | ManagedPackage::GooGet(p)
            | ManagedPackage::Yum(p)
            | ManagedPackage::Zypper(p) => p.desired_state,
            ManagedPackage::Deb(_) | ManagedPackage::Msi(_) | ManagedPackage::Rpm(_) => {
                DesiredState::Installed
            }
        }
    }

    /// The package name or source path the backend command operates on
    pub fn target(&self) -> String {
        match self {
            ManagedPackage::Apt(p)
            | ManagedPackage::GooGet(p)
            | ManagedPackage::Yum(p)
            | ManagedPackage::Zypper(p) => p.name.clone(),
            ManagedPackage::Deb(p) | ManagedPackage::Msi(p) | ManagedPackage::Rpm(p) => {
                p.source.display().to_string()
            }
        }
    }
}
