//! Installed plugin reconciliation
//!
//! Matches a caller-supplied list of installed plugins against the catalog
//! using an ordered tier of rules, and drives bulk star operations over the
//! matches.

pub mod bulk;

pub use bulk::{
    check_star_status, plan_bulk_star, scan_star_status, star_all, star_unstarred,
    BulkStarReport, CancellationToken, StarStatus, StarTarget,
};

use crate::catalog::{CatalogSnapshot, PluginCatalog, PluginRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Contract for an installed plugin descriptor
///
/// Any type exposing these fields can be reconciled; missing values are
/// empty strings.
pub trait InstalledItem {
    fn name(&self) -> &str;
    fn author(&self) -> &str;
    fn version(&self) -> &str;
    fn repo_url(&self) -> &str;
}

/// Plain installed plugin descriptor, e.g. read from a JSON listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstalledPlugin {
    pub name: String,
    pub author: String,
    pub version: String,
    #[serde(alias = "repo", alias = "repository")]
    pub repo_url: String,
}

impl InstalledItem for InstalledPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn repo_url(&self) -> &str {
        &self.repo_url
    }
}

/// Which rule produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    RepositoryUrl,
    Name,
    /// Never produced today: any item it would match has already matched
    /// on name alone. Do not rely on seeing it.
    AuthorAndName,
}

/// Reconciliation outcome for one installed item
#[derive(Debug, Clone)]
pub struct ReconciliationResult<'a, T> {
    /// The caller's descriptor, untouched
    pub installed: &'a T,
    /// Copy of the matched catalog record
    pub matched: Option<PluginRecord>,
    pub tier: Option<MatchTier>,
}

impl<T> ReconciliationResult<'_, T> {
    pub fn is_matched(&self) -> bool {
        self.matched.is_some()
    }

    /// Catalog id of the match (valid for the snapshot it was matched against)
    pub fn plugin_id(&self) -> Option<usize> {
        self.matched.as_ref().map(|r| r.id)
    }
}

/// Counts over a reconciliation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub matched: usize,
    pub local_only: usize,
}

impl ReconcileSummary {
    pub fn from_results<T>(results: &[ReconciliationResult<'_, T>]) -> Self {
        let matched = results.iter().filter(|r| r.is_matched()).count();
        Self {
            matched,
            local_only: results.len() - matched,
        }
    }
}

/// Canonical key for repository URL comparison
///
/// Lowercases, strips one trailing slash, then one trailing `.git`.
pub fn normalize_repo_url(url: &str) -> String {
    let lower = url.trim().to_lowercase();
    let without_slash = lower.strip_suffix('/').unwrap_or(&lower);
    without_slash
        .strip_suffix(".git")
        .unwrap_or(without_slash)
        .to_string()
}

/// Matches installed plugins against one catalog snapshot
pub struct InstalledReconciler {
    snapshot: Arc<CatalogSnapshot>,
}

impl InstalledReconciler {
    /// Reconcile against the catalog's current snapshot
    pub fn new(catalog: &PluginCatalog) -> Self {
        Self {
            snapshot: catalog.snapshot(),
        }
    }

    /// Reconcile against an explicit record set
    pub fn from_records(records: Vec<PluginRecord>) -> Self {
        Self {
            snapshot: Arc::new(CatalogSnapshot {
                records,
                ..Default::default()
            }),
        }
    }

    pub fn records(&self) -> &[PluginRecord] {
        &self.snapshot.records
    }

    /// Find the catalog record for one installed item
    ///
    /// Tiers are tried strictly in order: repository URL, name, author and name.
    pub fn match_item<T: InstalledItem + ?Sized>(
        &self,
        item: &T,
    ) -> Option<(MatchTier, &PluginRecord)> {
        let records = &self.snapshot.records;

        let repo = item.repo_url().trim();
        if !repo.is_empty() {
            let key = normalize_repo_url(repo);
            if let Some(record) = records
                .iter()
                .filter(|r| !r.repo_url.is_empty())
                .find(|r| normalize_repo_url(&r.repo_url) == key)
            {
                return Some((MatchTier::RepositoryUrl, record));
            }
        }

        let name = item.name().to_lowercase();
        if let Some(record) = records.iter().find(|r| r.name.to_lowercase() == name) {
            return Some((MatchTier::Name, record));
        }

        let author = item.author().trim().to_lowercase();
        if !author.is_empty() {
            if let Some(record) = records
                .iter()
                .find(|r| r.author.to_lowercase() == author && r.name.to_lowercase() == name)
            {
                return Some((MatchTier::AuthorAndName, record));
            }
        }

        None
    }

    /// Reconcile a whole installed list, preserving its order
    ///
    /// Items with an empty name are skipped.
    pub fn reconcile<'a, T: InstalledItem>(
        &self,
        installed: &'a [T],
    ) -> Vec<ReconciliationResult<'a, T>> {
        installed
            .iter()
            .filter(|item| !item.name().trim().is_empty())
            .map(|item| {
                let found = self.match_item(item);
                if found.is_none() {
                    tracing::debug!("No catalog match for installed plugin {}", item.name());
                }
                ReconciliationResult {
                    installed: item,
                    tier: found.map(|(tier, _)| tier),
                    matched: found.map(|(_, record)| record.clone()),
                }
            })
            .collect()
    }
}
