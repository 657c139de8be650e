//! Command execution port
//!
//! Every external process the reconciler launches goes through a
//! [`CommandRunner`]. Production code uses [`TokioCommandRunner`]; tests
//! substitute a scripted runner.

pub mod cancel;
pub mod error;
pub mod runner;

pub use cancel::CancelToken;
pub use error::CommandError;
pub use runner::{CommandOutput, CommandRunner, CommandSpec, TokioCommandRunner};
