//! "Auto-assign difficulty tags (5 levels)".

use super::{config, open_repository};
use crate::paths::AppPaths;
use difficulty_core::{BatchReport, DifficultyLabel, RunOptions};

/// Classify and tag the cards matching `query`.
///
/// The config is loaded first; a bad config stops the run before the
/// collection is opened.
pub fn execute(paths: &AppPaths, query: &str, options: RunOptions<'_>) -> anyhow::Result<BatchReport> {
    let cfg = config::load(&paths.config)?;
    let mut repo = open_repository(&paths.db)?;
    let report = difficulty_core::run(&mut repo, query, &cfg, options)?;
    Ok(report)
}

/// Human-readable summary of a run.
pub fn render(report: &BatchReport) -> String {
    if report.matched == 0 {
        return "No cards matched the search.\n".to_string();
    }

    let verb = if report.dry_run { "Would assign" } else { "Assigned" };
    let mut out = format!(
        "{verb} 5-level difficulty tags to {} cards ({} changed).\n",
        report.labelled(),
        report.changed
    );
    for label in DifficultyLabel::ALL {
        let count = report.assigned.get(&label).copied().unwrap_or(0);
        out.push_str(&format!("  {:<9} {count}\n", label.as_str()));
    }
    out.push_str(&format!("  {:<9} {}\n", "skipped", report.skipped));

    if !report.failures.is_empty() {
        out.push_str(&format!("{} cards failed:\n", report.failures.len()));
        for failure in &report.failures {
            out.push_str(&format!("  card {}: {}\n", failure.card_id, failure.message));
        }
    }
    if report.cancelled {
        out.push_str("Cancelled before all cards were processed.\n");
    }
    out
}
