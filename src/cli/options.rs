use clap::Parser;
use std::path::PathBuf;

/// Reconcile package resources against this machine
#[derive(Debug, Parser)]
#[command(name = "rustle-pkg")]
#[command(about = "Check and enforce declarative package resources")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct RustlePkgCli {
    /// Package resource files (YAML or JSON)
    #[arg(required = true)]
    pub resources: Vec<PathBuf>,

    /// Reconciler configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the installed-package cache TTL (seconds)
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// Report drift without enforcing
    #[arg(long)]
    pub check_only: bool,

    /// Print the enforcement command instead of running it
    #[arg(long, conflicts_with = "check_only")]
    pub dry_run: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl RustlePkgCli {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbosity {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
