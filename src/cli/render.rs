//! Plain-text rendering of catalog and reconciliation results

use crate::catalog::PluginRecord;
use crate::github::{ConnectivityReport, Identity};
use crate::reconcile::{
    BulkStarReport, InstalledItem, MatchTier, ReconcileSummary, ReconciliationResult, StarStatus,
};
use std::collections::BTreeMap;
use std::fmt::Write;

/// One-line listing entry
pub fn render_summary_line(record: &PluginRecord) -> String {
    format!(
        "[{}] {:<15} {} by {} ({} stars)",
        record.id, record.short_name, record.name, record.author, record.stars
    )
}

/// Numbered listing, or a placeholder when empty
pub fn render_list(records: &[PluginRecord]) -> String {
    if records.is_empty() {
        return "No plugins found.".to_string();
    }
    records
        .iter()
        .map(render_summary_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full detail block for one record
pub fn render_record(record: &PluginRecord) -> String {
    let tags = if record.tags.is_empty() {
        "-".to_string()
    } else {
        record.tags.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    let description = if record.description.is_empty() {
        "-"
    } else {
        record.description.as_str()
    };

    let mut out = String::new();
    let _ = writeln!(out, "#{} {} ({})", record.id, record.name, record.short_name);
    let _ = writeln!(out, "Author:      {}", record.author);
    let _ = writeln!(out, "Stars:       {}", record.stars);
    let _ = writeln!(out, "Language:    {}", record.language);
    let _ = writeln!(out, "Tags:        {}", tags);
    let _ = writeln!(out, "Repository:  {}", record.repo_url);
    let _ = write!(out, "Description: {}", description);
    out
}

pub fn render_status(status: StarStatus) -> String {
    status.to_string()
}

fn tier_label(tier: MatchTier) -> &'static str {
    match tier {
        MatchTier::RepositoryUrl => "repository",
        MatchTier::Name => "name",
        MatchTier::AuthorAndName => "author+name",
    }
}

/// Reconciliation table followed by the summary counts
///
/// Matched lines get a star status suffix when `statuses` has one for the
/// plugin id.
pub fn render_reconciliation<T: InstalledItem>(
    results: &[ReconciliationResult<'_, T>],
    statuses: &BTreeMap<usize, StarStatus>,
) -> String {
    let mut out = String::new();
    for result in results {
        let name = result.installed.name();
        match (&result.matched, result.tier) {
            (Some(record), Some(tier)) => {
                let _ = write!(
                    out,
                    "{:<28} -> #{} {} [{}]",
                    name,
                    record.id,
                    record.name,
                    tier_label(tier)
                );
                match statuses.get(&record.id) {
                    Some(status) => {
                        let _ = writeln!(out, " ({})", status);
                    }
                    None => out.push('\n'),
                }
            }
            _ => {
                let _ = writeln!(out, "{:<28} (local only)", name);
            }
        }
    }

    let summary = ReconcileSummary::from_results(results);
    let _ = write!(
        out,
        "{} matched, {} local only",
        summary.matched, summary.local_only
    );
    out
}

pub fn render_bulk_report(report: &BulkStarReport) -> String {
    let mut out = format!(
        "Starred {}, already starred {}, failed {}, check failed {}, skipped {}",
        report.starred.len(),
        report.already_starred.len(),
        report.failed.len(),
        report.check_failed.len(),
        report.skipped.len()
    );
    for (name, reason) in &report.failed {
        let _ = write!(out, "\n  failed: {} ({})", name, reason);
    }
    for (name, status) in &report.check_failed {
        let _ = write!(out, "\n  not checked: {} ({})", name, status);
    }
    out
}

pub fn render_identity(identity: &Identity) -> String {
    match &identity.name {
        Some(name) => format!(
            "{} ({}), {} public repos, {} followers",
            identity.login, name, identity.public_repos, identity.followers
        ),
        None => format!(
            "{}, {} public repos, {} followers",
            identity.login, identity.public_repos, identity.followers
        ),
    }
}

pub fn render_connectivity(report: &ConnectivityReport) -> String {
    if report.success {
        format!(
            "{} reachable in {} ms",
            report.endpoint,
            report.latency.as_millis()
        )
    } else {
        format!(
            "{} unreachable: {}",
            report.endpoint,
            report.error.as_deref().unwrap_or("unknown error")
        )
    }
}
