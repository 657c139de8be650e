//! Package resource descriptors as delivered by the policy transport
//!
//! A descriptor names exactly one backend block plus a desired state. On the
//! wire every backend is an optional key; [`PackageResourceSpec`] collapses
//! them into a single [`SystemPackage`] and refuses descriptors that set more
//! than one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DesiredState {
    Installed,
    Removed,
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesiredState::Installed => write!(f, "INSTALLED"),
            DesiredState::Removed => write!(f, "REMOVED"),
        }
    }
}

/// Location of a package artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WirePackageSource", into = "WirePackageSource")]
pub enum PackageSource {
    LocalPath(PathBuf),
    Remote {
        uri: Url,
        sha256_checksum: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RemoteSource {
    uri: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sha256_checksum: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[doc(hidden)]
pub struct WirePackageSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remote: Option<RemoteSource>,
}

impl TryFrom<WirePackageSource> for PackageSource {
    type Error = DescriptorError;

    fn try_from(wire: WirePackageSource) -> Result<Self, Self::Error> {
        match (wire.local_path, wire.remote) {
            (Some(path), None) => Ok(PackageSource::LocalPath(path)),
            (None, Some(remote)) => Ok(PackageSource::Remote {
                uri: remote.uri,
                sha256_checksum: remote.sha256_checksum,
            }),
            (None, None) => Err(DescriptorError::MissingSource),
            (Some(_), Some(_)) => Err(DescriptorError::AmbiguousSource),
        }
    }
}

impl From<PackageSource> for WirePackageSource {
    fn from(source: PackageSource) -> Self {
        match source {
            PackageSource::LocalPath(path) => WirePackageSource {
                local_path: Some(path),
                remote: None,
            },
            PackageSource::Remote {
                uri,
                sha256_checksum,
            } => WirePackageSource {
                local_path: None,
                remote: Some(RemoteSource {
                    uri,
                    sha256_checksum,
                }),
            },
        }
    }
}

impl fmt::Display for PackageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageSource::LocalPath(path) => write!(f, "{}", path.display()),
            PackageSource::Remote { uri, .. } => write!(f, "{uri}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedPackageSpec {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePackageSpec {
    pub source: PackageSource,
}

/// The backend block of a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemPackage {
    Apt(NamedPackageSpec),
    Deb(SourcePackageSpec),
    GooGet(NamedPackageSpec),
    Msi(SourcePackageSpec),
    Yum(NamedPackageSpec),
    Zypper(NamedPackageSpec),
    Rpm(SourcePackageSpec),
}

impl SystemPackage {
    pub fn apt(name: impl Into<String>) -> Self {
        SystemPackage::Apt(NamedPackageSpec { name: name.into() })
    }

    pub fn googet(name: impl Into<String>) -> Self {
        SystemPackage::GooGet(NamedPackageSpec { name: name.into() })
    }

    pub fn yum(name: impl Into<String>) -> Self {
        SystemPackage::Yum(NamedPackageSpec { name: name.into() })
    }

    pub fn zypper(name: impl Into<String>) -> Self {
        SystemPackage::Zypper(NamedPackageSpec { name: name.into() })
    }

    pub fn deb(source: PackageSource) -> Self {
        SystemPackage::Deb(SourcePackageSpec { source })
    }

    pub fn msi(source: PackageSource) -> Self {
        SystemPackage::Msi(SourcePackageSpec { source })
    }

    pub fn rpm(source: PackageSource) -> Self {
        SystemPackage::Rpm(SourcePackageSpec { source })
    }
}

/// A package resource as received: immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WirePackageResource", into = "WirePackageResource")]
pub struct PackageResourceSpec {
    pub desired_state: DesiredState,
    pub system_package: Option<SystemPackage>,
}

impl PackageResourceSpec {
    pub fn new(desired_state: DesiredState, system_package: SystemPackage) -> Self {
        Self {
            desired_state,
            system_package: Some(system_package),
        }
    }

    /// A descriptor with no backend block
    pub fn blank(desired_state: DesiredState) -> Self {
        Self {
            desired_state,
            system_package: None,
        }
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }

    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

/// Flat wire shape: one optional key per backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[doc(hidden)]
pub struct WirePackageResource {
    desired_state: Option<DesiredState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    apt: Option<NamedPackageSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deb: Option<SourcePackageSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    googet: Option<NamedPackageSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    msi: Option<SourcePackageSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    yum: Option<NamedPackageSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zypper: Option<NamedPackageSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rpm: Option<SourcePackageSpec>,
}

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("desired_state is required")]
    MissingDesiredState,

    #[error("Exactly one package manager block may be set, found: {found:?}")]
    MultipleBackends { found: Vec<&'static str> },

    #[error("source requires one of local_path or remote")]
    MissingSource,

    #[error("source may set only one of local_path or remote")]
    AmbiguousSource,
}

impl TryFrom<WirePackageResource> for PackageResourceSpec {
    type Error = DescriptorError;

    fn try_from(wire: WirePackageResource) -> Result<Self, Self::Error> {
        let desired_state = wire
            .desired_state
            .ok_or(DescriptorError::MissingDesiredState)?;

        let candidates = [
            ("apt", wire.apt.map(SystemPackage::Apt)),
            ("deb", wire.deb.map(SystemPackage::Deb)),
            ("googet", wire.googet.map(SystemPackage::GooGet)),
            ("msi", wire.msi.map(SystemPackage::Msi)),
            ("yum", wire.yum.map(SystemPackage::Yum)),
            ("zypper", wire.zypper.map(SystemPackage::Zypper)),
            ("rpm", wire.rpm.map(SystemPackage::Rpm)),
        ];

        let mut present: Vec<(&'static str, SystemPackage)> = candidates
            .into_iter()
            .filter_map(|(key, package)| package.map(|p| (key, p)))
            .collect();

        if present.len() > 1 {
            return Err(DescriptorError::MultipleBackends {
                found: present.iter().map(|(key, _)| *key).collect(),
            });
        }

        Ok(PackageResourceSpec {
            desired_state,
            system_package: present.pop().map(|(_, package)| package),
        })
    }
}

impl From<PackageResourceSpec> for WirePackageResource {
    fn from(spec: PackageResourceSpec) -> Self {
        let mut wire = WirePackageResource {
            desired_state: Some(spec.desired_state),
            ..Default::default()
        };
        match spec.system_package {
            Some(SystemPackage::Apt(p)) => wire.apt = Some(p),
            Some(SystemPackage::Deb(p)) => wire.deb = Some(p),
            Some(SystemPackage::GooGet(p)) => wire.googet = Some(p),
            Some(SystemPackage::Msi(p)) => wire.msi = Some(p),
            Some(SystemPackage::Yum(p)) => wire.yum = Some(p),
            Some(SystemPackage::Zypper(p)) => wire.zypper = Some(p),
            Some(SystemPackage::Rpm(p)) => wire.rpm = Some(p),
            None => {}
        }
        wire
    }
}
