//! Package resource lifecycle: validate, check, enforce

use serde::Serialize;
use tracing::{info, warn};

use crate::reconcile::{
    checker,
    context::ReconcileContext,
    enforcer,
    error::ResourceError,
    managed::ManagedPackage,
    source::ResolvedSource,
    validator,
};
use crate::resource::PackageResourceSpec;

/// Where a resource is in its lifecycle. `Enforced` means a command ran and
/// the installed state is unknown until the next check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum ResourceState {
    Unvalidated,
    Validated,
    Checked { in_desired_state: bool },
    Enforced,
}

/// Result of [`PackageResource::reconcile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    InDesiredState,
    Enforced,
}

#[derive(Debug)]
pub struct PackageResource {
    spec: PackageResourceSpec,
    managed: Option<ManagedPackage>,
    // Keeps a downloaded source alive for as long as the package refers to it
    resolved: Option<ResolvedSource>,
    state: ResourceState,
    validation_error: Option<String>,
}

impl PackageResource {
    pub fn new(spec: PackageResourceSpec) -> Self {
        Self {
            spec,
            managed: None,
            resolved: None,
            state: ResourceState::Unvalidated,
            validation_error: None,
        }
    }

    pub fn spec(&self) -> &PackageResourceSpec {
        &self.spec
    }

    /// Replace the descriptor. The resource must be validated again.
    pub fn set_spec(&mut self, spec: PackageResourceSpec) {
        self.spec = spec;
        self.reset();
    }

    pub fn managed_package(&self) -> Option<&ManagedPackage> {
        self.managed.as_ref()
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    /// True only directly after a check that found no drift
    pub fn in_desired_state(&self) -> bool {
        matches!(
            self.state,
            ResourceState::Checked {
                in_desired_state: true
            }
        )
    }

    /// Message of the most recent validation failure
    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    /// Build the managed package from the descriptor, replacing any previous one.
    pub async fn validate(&mut self, ctx: &ReconcileContext) -> Result<(), ResourceError> {
        self.reset();

        match validator::validate(&self.spec, ctx).await {
            Ok(validated) => {
                self.managed = Some(validated.package);
                self.resolved = validated.resolved;
                self.state = ResourceState::Validated;
                Ok(())
            }
            Err(err) => {
                warn!("Package resource validation failed: {}", err);
                self.validation_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Compare the managed package against the machine.
    ///
    /// On error the previous state is left untouched.
    pub async fn check_state(&mut self, ctx: &ReconcileContext) -> Result<(), ResourceError> {
        let package = self.managed.as_ref().ok_or(ResourceError::NotValidated)?;
        let in_desired_state = checker::check(package, ctx).await?;
        self.state = ResourceState::Checked { in_desired_state };
        Ok(())
    }

    /// Run the backend command for the desired state. Does not re-check.
    pub async fn enforce_state(&mut self, ctx: &ReconcileContext) -> Result<(), ResourceError> {
        let package = self.managed.as_ref().ok_or(ResourceError::NotValidated)?;
        let result = enforcer::enforce(package, ctx).await;
        // A failed command may still have changed the machine
        self.state = ResourceState::Enforced;
        result.map_err(Into::into)
    }

    /// Check, then enforce if the package drifted.
    pub async fn reconcile(&mut self, ctx: &ReconcileContext) -> Result<Outcome, ResourceError> {
        self.check_state(ctx).await?;
        if self.in_desired_state() {
            return Ok(Outcome::InDesiredState);
        }
        self.enforce_state(ctx).await?;
        if let Some(package) = &self.managed {
            info!(
                "Enforced {} package {} to {}",
                package.backend(),
                package.target(),
                package.desired_state()
            );
        }
        Ok(Outcome::Enforced)
    }

    fn reset(&mut self) {
        self.managed = None;
        self.resolved = None;
        self.state = ResourceState::Unvalidated;
        self.validation_error = None;
    }
}
