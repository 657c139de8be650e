pub mod commands;
pub mod options;
pub mod output;

pub use commands::*;
pub use options::*;
pub use output::*;
