//! Convergence: issuing the install or remove command

use tracing::info;

use crate::exec::CommandSpec;
use crate::reconcile::{context::ReconcileContext, error::EnforcementError, managed::ManagedPackage};
use crate::resource::DesiredState;

/// The command that moves `package` to its desired state.
pub fn build_enforce_command(package: &ManagedPackage) -> Result<CommandSpec, EnforcementError> {
    let backend = package.backend();
    let descriptor = backend.descriptor();
    let target = package.target();

    match package.desired_state() {
        DesiredState::Installed => Ok(descriptor.install_command(&target)),
        DesiredState::Removed => {
            descriptor
                .remove_command(&target)
                .ok_or(EnforcementError::Unsupported {
                    backend,
                    state: DesiredState::Removed,
                })
        }
    }
}

/// Run the enforcement command once. Failures are returned unchanged and not
/// retried.
pub async fn enforce(
    package: &ManagedPackage,
    ctx: &ReconcileContext,
) -> Result<(), EnforcementError> {
    let command = build_enforce_command(package)?;
    let backend = package.backend();

    info!(
        "Enforcing {} package {} to {}: {}",
        backend,
        package.target(),
        package.desired_state(),
        command
    );

    let result = ctx.runner().run(ctx.cancel_token(), &command).await;

    // Whatever happened, the installed set may have changed underneath us.
    if let Some(cache) = ctx.caches().get(backend) {
        cache.invalidate();
    }

    result
        .map(|_| ())
        .map_err(|source| EnforcementError::CommandFailed {
            backend,
            target: package.target(),
            source,
        })
}
