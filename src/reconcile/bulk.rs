//! Bulk star status scans and bulk starring
//!
//! Both operations walk their targets strictly one at a time. Starring waits
//! a fixed delay between consecutive requests to stay clear of secondary
//! rate limits.

use super::ReconciliationResult;
use crate::catalog::PluginRecord;
use crate::github::{parse_repo_url, ErrorKind, HostingError, HostingResult, RepositoryClient};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default pause between consecutive star requests
pub const DEFAULT_STAR_DELAY: Duration = Duration::from_millis(500);

/// Token for stopping a bulk operation between items
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A repository to check or star
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarTarget {
    pub name: String,
    pub repo_url: String,
    pub plugin_id: Option<usize>,
}

impl From<&PluginRecord> for StarTarget {
    fn from(record: &PluginRecord) -> Self {
        Self {
            name: record.name.clone(),
            repo_url: record.repo_url.clone(),
            plugin_id: Some(record.id),
        }
    }
}

/// Star status of one target, as seen by a bulk scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarStatus {
    Starred,
    NotStarred,
    /// Repository missing or inaccessible
    Missing,
    /// Repository URL could not be parsed
    Unresolvable,
    /// Check failed for another reason
    Unknown(ErrorKind),
}

impl StarStatus {
    /// Map a tri-state check result onto a status
    pub fn from_check(result: &HostingResult<bool>) -> Self {
        match result {
            Ok(true) => StarStatus::Starred,
            Ok(false) | Err(HostingError::NotStarred) => StarStatus::NotStarred,
            Err(HostingError::NotFound(_)) => StarStatus::Missing,
            Err(e) => StarStatus::Unknown(e.kind()),
        }
    }
}

impl fmt::Display for StarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StarStatus::Starred => write!(f, "starred"),
            StarStatus::NotStarred => write!(f, "not starred"),
            StarStatus::Missing => write!(f, "repository missing or inaccessible"),
            StarStatus::Unresolvable => write!(f, "repository URL not recognized"),
            StarStatus::Unknown(kind) => write!(f, "unknown ({})", kind),
        }
    }
}

/// Outcome of a bulk star run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkStarReport {
    pub starred: Vec<String>,
    /// Targets whose check found them starred already; no request was sent
    pub already_starred: Vec<String>,
    /// Target name and reason
    pub failed: Vec<(String, String)>,
    /// Target name and the status that kept it from being starred
    pub check_failed: Vec<(String, String)>,
    /// Targets not attempted because the run was cancelled
    pub skipped: Vec<String>,
}

/// Targets for a bulk star run
///
/// All matched records, plus the catalog record whose name contains
/// `self_name` when it is not already among them.
pub fn plan_bulk_star<T>(
    results: &[ReconciliationResult<'_, T>],
    records: &[PluginRecord],
    self_name: &str,
) -> Vec<StarTarget> {
    let mut targets: Vec<StarTarget> = results
        .iter()
        .filter_map(|r| r.matched.as_ref())
        .map(StarTarget::from)
        .collect();

    let self_name = self_name.trim().to_lowercase();
    if !self_name.is_empty() {
        let own = records
            .iter()
            .find(|r| r.name.to_lowercase() == self_name)
            .or_else(|| records.iter().find(|r| r.name.to_lowercase().contains(&self_name)));
        if let Some(own) = own {
            if !targets.iter().any(|t| t.plugin_id == Some(own.id)) {
                targets.push(StarTarget::from(own));
            }
        }
    }

    targets
}

/// Tri-state check for a single target
pub async fn check_star_status(client: &RepositoryClient, target: &StarTarget) -> StarStatus {
    let Some(repo) = parse_repo_url(&target.repo_url) else {
        tracing::debug!("Cannot resolve repository URL: {}", target.repo_url);
        return StarStatus::Unresolvable;
    };

    let result = client.is_starred(&repo.owner, &repo.name).await;
    if let Err(e) = &result {
        tracing::debug!("Star check for {} ended with {}: {}", target.name, e.kind(), e);
    }
    StarStatus::from_check(&result)
}

/// Check every target in order; a failed check never stops the scan
pub async fn scan_star_status(
    client: &RepositoryClient,
    targets: &[StarTarget],
) -> Vec<(StarTarget, StarStatus)> {
    let mut statuses = Vec::with_capacity(targets.len());
    for target in targets {
        let status = check_star_status(client, target).await;
        statuses.push((target.clone(), status));
    }
    statuses
}

/// Star every target in order, pausing `delay` between requests
///
/// Cancellation is honored between items; an in-flight request is never
/// interrupted.
pub async fn star_all(
    client: &RepositoryClient,
    targets: &[StarTarget],
    delay: Duration,
    cancel: &CancellationToken,
) -> BulkStarReport {
    let mut report = BulkStarReport::default();

    for (i, target) in targets.iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!("Bulk star cancelled; {} target(s) skipped", targets.len() - i);
            report
                .skipped
                .extend(targets[i..].iter().map(|t| t.name.clone()));
            break;
        }

        match parse_repo_url(&target.repo_url) {
            Some(repo) => {
                if client.set_starred(&repo.owner, &repo.name).await {
                    report.starred.push(target.name.clone());
                } else {
                    report
                        .failed
                        .push((target.name.clone(), "star request failed".to_string()));
                }
            }
            None => report.failed.push((
                target.name.clone(),
                "cannot resolve repository URL".to_string(),
            )),
        }

        if i + 1 < targets.len() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    tracing::info!(
        "Bulk star finished: {} starred, {} failed, {} skipped",
        report.starred.len(),
        report.failed.len(),
        report.skipped.len()
    );

    report
}

/// Check every target first, then star only the ones not yet starred
///
/// Targets whose check ends in anything other than starred or not starred
/// are reported under `check_failed` and never sent a star request.
pub async fn star_unstarred(
    client: &RepositoryClient,
    targets: &[StarTarget],
    delay: Duration,
    cancel: &CancellationToken,
) -> BulkStarReport {
    let mut already_starred = Vec::new();
    let mut check_failed = Vec::new();
    let mut pending = Vec::new();

    for (target, status) in scan_star_status(client, targets).await {
        match status {
            StarStatus::Starred => already_starred.push(target.name),
            StarStatus::NotStarred => pending.push(target),
            other => check_failed.push((target.name, other.to_string())),
        }
    }

    tracing::info!(
        "Star check: {} to star, {} already starred, {} check failed",
        pending.len(),
        already_starred.len(),
        check_failed.len()
    );

    let mut report = star_all(client, &pending, delay, cancel).await;
    report.already_starred = already_starred;
    report.check_failed = check_failed;
    report
}
