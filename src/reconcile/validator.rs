//! Descriptor to managed package conversion

use tracing::debug;

use crate::packages::Backend;
use crate::reconcile::{
    context::ReconcileContext,
    error::ValidationError,
    managed::{ManagedPackage, NamedPackage, SourcePackage},
    source::{self, ResolvedSource},
};
use crate::resource::{
    DesiredState, NamedPackageSpec, PackageResourceSpec, SourcePackageSpec, SystemPackage,
};

/// A validated package plus the download directory backing its source, if any
#[derive(Debug)]
pub struct Validated {
    pub package: ManagedPackage,
    pub resolved: Option<ResolvedSource>,
}

pub async fn validate(
    spec: &PackageResourceSpec,
    ctx: &ReconcileContext,
) -> Result<Validated, ValidationError> {
    let system_package = spec.system_package.as_ref().ok_or(ValidationError::Blank)?;
    let state = spec.desired_state;

    let named = |backend: Backend, pkg: &NamedPackageSpec| -> Result<NamedPackage, ValidationError> {
        if pkg.name.trim().is_empty() {
            return Err(ValidationError::EmptyName { backend });
        }
        Ok(NamedPackage::new(state, pkg.name.clone()))
    };

    let validated = match system_package {
        SystemPackage::Apt(pkg) => named_only(ManagedPackage::Apt(named(Backend::Apt, pkg)?)),
        SystemPackage::GooGet(pkg) => {
            named_only(ManagedPackage::GooGet(named(Backend::GooGet, pkg)?))
        }
        SystemPackage::Yum(pkg) => named_only(ManagedPackage::Yum(named(Backend::Yum, pkg)?)),
        SystemPackage::Zypper(pkg) => {
            named_only(ManagedPackage::Zypper(named(Backend::Zypper, pkg)?))
        }
        SystemPackage::Deb(pkg) => {
            from_source(Backend::Deb, state, pkg, ctx, ManagedPackage::Deb).await?
        }
        SystemPackage::Msi(pkg) => {
            from_source(Backend::Msi, state, pkg, ctx, ManagedPackage::Msi).await?
        }
        SystemPackage::Rpm(pkg) => {
            from_source(Backend::Rpm, state, pkg, ctx, ManagedPackage::Rpm).await?
        }
    };

    debug!(
        "Validated {} package {} ({})",
        validated.package.backend(),
        validated.package.target(),
        validated.package.desired_state()
    );
    Ok(validated)
}

fn named_only(package: ManagedPackage) -> Validated {
    Validated {
        package,
        resolved: None,
    }
}

async fn from_source(
    backend: Backend,
    state: DesiredState,
    pkg: &SourcePackageSpec,
    ctx: &ReconcileContext,
    wrap: fn(SourcePackage) -> ManagedPackage,
) -> Result<Validated, ValidationError> {
    // An artifact reference cannot name the installed unit to remove.
    if state != DesiredState::Installed {
        return Err(ValidationError::UnsupportedState { backend, state });
    }

    let resolved = source::resolve(&pkg.source, ctx).await?;
    Ok(Validated {
        package: wrap(SourcePackage::new(resolved.path.clone())),
        resolved: Some(resolved),
    })
}
