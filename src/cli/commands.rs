use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::packages::Backend;
use crate::reconcile::{build_enforce_command, PackageResource, ReconcileContext, ResourceError};
use crate::resource::{DesiredState, PackageResourceSpec};

/// What the CLI does once a resource has been checked
#[derive(Debug, Clone, Copy, Default)]
pub struct RunMode {
    pub check_only: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Validate,
    Check,
    Enforce,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum ReportOutcome {
    InDesiredState,
    Drifted,
    WouldEnforce { command: String },
    Enforced,
    Failed {
        stage: Stage,
        error: String,
        cancelled: bool,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceReport {
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_state: Option<DesiredState>,
    pub outcome: ReportOutcome,
}

impl ResourceReport {
    pub fn failed(&self) -> bool {
        matches!(self.outcome, ReportOutcome::Failed { .. })
    }

    fn new(file: &Path, outcome: ReportOutcome) -> Self {
        Self {
            file: file.to_path_buf(),
            backend: None,
            target: None,
            desired_state: None,
            outcome,
        }
    }
}

/// Read a resource descriptor. YAML is a superset of JSON, so both parse.
pub fn load_resource(path: &Path) -> Result<PackageResourceSpec> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read resource {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Invalid package resource {}", path.display()))
}

/// Validate, check and (depending on `mode`) enforce one resource file.
pub async fn apply_resource(file: &Path, ctx: &ReconcileContext, mode: RunMode) -> ResourceReport {
    let spec = match load_resource(file) {
        Ok(spec) => spec,
        Err(err) => {
            return ResourceReport::new(
                file,
                ReportOutcome::Failed {
                    stage: Stage::Load,
                    error: format!("{err:#}"),
                    cancelled: false,
                },
            )
        }
    };

    let mut resource = PackageResource::new(spec);
    let outcome = drive(&mut resource, ctx, mode).await;

    let mut report = ResourceReport::new(file, outcome);
    if let Some(package) = resource.managed_package() {
        report.backend = Some(package.backend());
        report.target = Some(package.target());
        report.desired_state = Some(package.desired_state());
    }
    report
}

async fn drive(resource: &mut PackageResource, ctx: &ReconcileContext, mode: RunMode) -> ReportOutcome {
    let failed = |stage: Stage, err: ResourceError| {
        warn!("{:?} failed: {}", stage, err);
        ReportOutcome::Failed {
            stage,
            cancelled: err.is_cancelled(),
            error: err.to_string(),
        }
    };

    if let Err(err) = resource.validate(ctx).await {
        return failed(Stage::Validate, err);
    }
    if let Err(err) = resource.check_state(ctx).await {
        return failed(Stage::Check, err);
    }
    if resource.in_desired_state() {
        return ReportOutcome::InDesiredState;
    }
    if mode.check_only {
        return ReportOutcome::Drifted;
    }

    if mode.dry_run {
        let Some(package) = resource.managed_package() else {
            return failed(Stage::Enforce, ResourceError::NotValidated);
        };
        return match build_enforce_command(package) {
            Ok(command) => ReportOutcome::WouldEnforce {
                command: command.to_string(),
            },
            Err(err) => failed(Stage::Enforce, err.into()),
        };
    }

    match resource.enforce_state(ctx).await {
        Ok(()) => ReportOutcome::Enforced,
        Err(err) => failed(Stage::Enforce, err),
    }
}

/// Apply every resource file concurrently over one shared context.
pub async fn apply_all(files: &[PathBuf], ctx: &ReconcileContext, mode: RunMode) -> Vec<ResourceReport> {
    info!("Applying {} package resources", files.len());
    futures::future::join_all(files.iter().map(|file| apply_resource(file, ctx, mode))).await
}
