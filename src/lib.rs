//! Rustle Pkg - package resource reconciliation
//!
//! This crate validates declarative package resources ("package X shall be
//! installed via apt"), detects drift against the live machine and converges
//! it by invoking the matching package manager.

pub mod cli;
pub mod config;
pub mod exec;
pub mod packages;
pub mod reconcile;
pub mod resource;

pub use config::ReconcileConfig;
pub use exec::{CancelToken, CommandRunner, CommandSpec};
pub use packages::Backend;
pub use reconcile::{
    ManagedPackage, NamedPackage, Outcome, PackageResource, ReconcileContext, ResourceError,
    ResourceState, SourcePackage,
};
pub use resource::{DesiredState, PackageResourceSpec, PackageSource, SystemPackage};
