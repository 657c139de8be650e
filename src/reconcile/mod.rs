//! Package resource reconciliation
//!
//! [`PackageResource`] drives a descriptor through validation, drift
//! detection and enforcement against a shared [`ReconcileContext`].

pub mod checker;
pub mod context;
pub mod enforcer;
pub mod error;
pub mod managed;
pub mod resource;
pub mod source;
pub mod validator;

pub use context::ReconcileContext;
pub use enforcer::build_enforce_command;
pub use error::{EnforcementError, ResourceError, ValidationError};
pub use managed::{ManagedPackage, NamedPackage, SourcePackage};
pub use resource::{Outcome, PackageResource, ResourceState};
