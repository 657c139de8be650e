//! Drift detection

use tracing::debug;

use crate::packages::CacheRefreshError;
use crate::reconcile::{context::ReconcileContext, managed::ManagedPackage};
use crate::resource::DesiredState;

/// Whether `package` is currently in its desired state.
///
/// Source-based packages have no installed-name cache to consult and are
/// always reported as drifted; their installers are idempotent.
pub async fn check(
    package: &ManagedPackage,
    ctx: &ReconcileContext,
) -> Result<bool, CacheRefreshError> {
    let (desired_state, name) = match package {
        ManagedPackage::Apt(p)
        | ManagedPackage::GooGet(p)
        | ManagedPackage::Yum(p)
        | ManagedPackage::Zypper(p) => (p.desired_state, p.name.as_str()),
        ManagedPackage::Deb(_) | ManagedPackage::Msi(_) | ManagedPackage::Rpm(_) => {
            debug!(
                "{} package {} has no installed check, enforcement required",
                package.backend(),
                package.target()
            );
            return Ok(false);
        }
    };

    let backend = package.backend();
    let cache = ctx
        .caches()
        .get(backend)
        .ok_or(CacheRefreshError::Unsupported { backend })?;
    cache.ensure_fresh(ctx.runner(), ctx.cancel_token()).await?;

    let present = cache.contains(name);
    let in_desired_state = match desired_state {
        DesiredState::Installed => present,
        DesiredState::Removed => !present,
    };

    debug!(
        "{} package {}: present={}, desired={}, in desired state={}",
        backend, name, present, desired_state, in_desired_state
    );
    Ok(in_desired_state)
}
