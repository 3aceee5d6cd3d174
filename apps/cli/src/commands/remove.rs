//! "Remove difficulty tags".

use super::open_repository;
use crate::paths::AppPaths;
use difficulty_core::{RemovalReport, RunOptions};

/// Strip difficulty tags from the cards matching `query`.
pub fn execute(paths: &AppPaths, query: &str, options: RunOptions<'_>) -> anyhow::Result<RemovalReport> {
    let mut repo = open_repository(&paths.db)?;
    let report = difficulty_core::remove_matching(&mut repo, query, options)?;
    Ok(report)
}

pub fn render(report: &RemovalReport) -> String {
    let verb = if report.dry_run { "Would remove" } else { "Removed" };
    let mut out = format!(
        "{verb} difficulty tags from {} of {} cards.\n",
        report.modified, report.examined
    );
    for failure in &report.failures {
        out.push_str(&format!("  card {}: {}\n", failure.card_id, failure.message));
    }
    if report.cancelled {
        out.push_str("Cancelled before all cards were processed.\n");
    }
    out
}
