use crate::cli::commands::{ReportOutcome, ResourceReport};

/// Print reports in human-readable format
pub fn print_reports(reports: &[ResourceReport]) {
    for report in reports {
        let subject = match (&report.backend, &report.target, &report.desired_state) {
            (Some(backend), Some(target), Some(state)) => format!("{backend} {target} ({state})"),
            _ => report.file.display().to_string(),
        };

        match &report.outcome {
            ReportOutcome::InDesiredState => println!("✅ {subject}: in desired state"),
            ReportOutcome::Drifted => println!("⚠️  {subject}: not in desired state"),
            ReportOutcome::WouldEnforce { command } => {
                println!("🔍 {subject}: would run `{command}`")
            }
            ReportOutcome::Enforced => println!("🔧 {subject}: enforced"),
            ReportOutcome::Failed {
                stage,
                error,
                cancelled,
            } => {
                let label = if *cancelled { "cancelled" } else { "failed" };
                println!("❌ {subject}: {stage:?} {label}: {error}");
            }
        }
    }

    let failed = reports.iter().filter(|r| r.failed()).count();
    println!();
    println!("{} resources, {} failed", reports.len(), failed);
}

pub fn print_reports_json(reports: &[ResourceReport]) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(reports)?);
    Ok(())
}
