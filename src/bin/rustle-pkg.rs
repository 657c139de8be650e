use anyhow::{Context, Result};
use clap::Parser;
use rustle_pkg::cli::{apply_all, print_reports, print_reports_json, OutputFormat, RunMode, RustlePkgCli};
use rustle_pkg::{CancelToken, ReconcileConfig, ReconcileContext};
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = RustlePkgCli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    info!("Starting rustle-pkg v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => ReconcileConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReconcileConfig::default(),
    };
    if let Some(ttl) = cli.cache_ttl {
        config.cache_ttl = Duration::from_secs(ttl);
    }

    let cancel = CancelToken::new();
    let ctx = ReconcileContext::system(config)
        .context("Failed to build the HTTP client for remote sources")?
        .with_cancel(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling running package commands");
            cancel.cancel();
        }
    });

    let mode = RunMode {
        check_only: cli.check_only,
        dry_run: cli.dry_run,
    };
    let reports = apply_all(&cli.resources, &ctx, mode).await;

    match cli.format {
        OutputFormat::Text => print_reports(&reports),
        OutputFormat::Json => print_reports_json(&reports)?,
    }

    let failed = reports.iter().filter(|r| r.failed()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} package resources failed", reports.len());
    }
    Ok(())
}
