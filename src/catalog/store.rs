//! Plugin catalog with staleness-based refresh
//!
//! Loads the plugin index from an ordered list of mirrors and publishes the
//! normalized, ranked record set as one immutable snapshot.

use super::record::{parse_index, PluginRecord};
use super::search;
use super::source::{create_mirror, MirrorSource};
use super::{CatalogError, CatalogResult};
use crate::config::schema::CatalogConfig;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Default minimum age before a loaded catalog is refreshed
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(3600);

/// Immutable view of one successful load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    /// Records ranked by stars, ids 1..N in that order
    pub records: Vec<PluginRecord>,
    /// When this snapshot was published; `None` before the first load
    pub refreshed_at: Option<Instant>,
    /// Wall-clock publish time, for display
    pub loaded_at: Option<DateTime<Utc>>,
    /// Mirror that produced the records
    pub source: Option<String>,
}

/// Plugin catalog
///
/// Readers always see either the complete previous snapshot or the complete
/// new one. At most one load runs at a time.
pub struct PluginCatalog {
    mirrors: Vec<Box<dyn MirrorSource>>,
    state: RwLock<Arc<CatalogSnapshot>>,
    /// Serializes loads, including the staleness check that precedes them
    refresh_lock: Mutex<()>,
    staleness_window: Duration,
}

impl PluginCatalog {
    /// Create an empty catalog over the given mirrors (tried in order)
    pub fn new(mirrors: Vec<Box<dyn MirrorSource>>) -> Self {
        Self {
            mirrors,
            state: RwLock::new(Arc::new(CatalogSnapshot::default())),
            refresh_lock: Mutex::new(()),
            staleness_window: DEFAULT_STALENESS_WINDOW,
        }
    }

    /// Create a catalog from configuration
    pub fn from_config(config: &CatalogConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let mirrors = config
            .mirrors
            .iter()
            .map(|location| create_mirror(location, timeout))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self::new(mirrors).with_staleness_window(Duration::from_secs(config.staleness_secs)))
    }

    pub fn with_staleness_window(mut self, window: Duration) -> Self {
        self.staleness_window = window;
        self
    }

    pub fn staleness_window(&self) -> Duration {
        self.staleness_window
    }

    /// Current published snapshot
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let guard = self.state.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Copy of the current records in ranking order
    pub fn records(&self) -> Vec<PluginRecord> {
        self.snapshot().records.clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().records.is_empty()
    }

    /// Record with the given id in the current snapshot
    pub fn get(&self, id: usize) -> Option<PluginRecord> {
        self.snapshot().records.iter().find(|r| r.id == id).cloned()
    }

    /// Mirror that produced the current snapshot
    pub fn loaded_from(&self) -> Option<String> {
        self.snapshot().source.clone()
    }

    /// Whether the staleness window has elapsed (always true before the first load)
    pub fn is_stale(&self) -> bool {
        match self.snapshot().refreshed_at {
            None => true,
            Some(at) => at.elapsed() >= self.staleness_window,
        }
    }

    /// Load the catalog from the first mirror yielding at least one record
    ///
    /// Returns the number of published records. On failure the previous
    /// snapshot is left untouched.
    pub async fn load(&self) -> CatalogResult<usize> {
        let _guard = self.refresh_lock.lock().await;
        self.load_locked().await
    }

    /// Load only if the staleness window has elapsed
    ///
    /// Returns `Ok(false)` without touching the network when the catalog is fresh.
    pub async fn refresh_if_stale(&self) -> CatalogResult<bool> {
        let _guard = self.refresh_lock.lock().await;

        // Checked under the lock so concurrent callers trigger one load
        if !self.is_stale() {
            tracing::debug!("Catalog is fresh; skipping refresh");
            return Ok(false);
        }

        self.load_locked().await.map(|_| true)
    }

    async fn load_locked(&self) -> CatalogResult<usize> {
        if self.mirrors.is_empty() {
            return Err(CatalogError::NoSources);
        }

        for mirror in &self.mirrors {
            let location = mirror.location();
            tracing::info!("Loading plugin index from {}", location);

            let text = match mirror.fetch().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to load from {}: {:#}", location, e);
                    continue;
                }
            };

            let records = match build_records(&text) {
                Ok(records) => records,
                Err(e) => {
                    tracing::error!("Failed to parse index from {}: {}", location, e);
                    tracing::debug!("Response prefix: {}", text.chars().take(200).collect::<String>());
                    continue;
                }
            };

            if records.is_empty() {
                tracing::warn!("Index from {} yielded no valid records", location);
                continue;
            }

            let count = records.len();
            self.publish(CatalogSnapshot {
                records,
                refreshed_at: Some(Instant::now()),
                loaded_at: Some(Utc::now()),
                source: Some(location.clone()),
            });

            tracing::info!("Loaded {} plugins from {}", count, location);
            return Ok(count);
        }

        tracing::error!("All {} catalog mirrors failed", self.mirrors.len());
        Err(CatalogError::AllSourcesFailed {
            attempted: self.mirrors.len(),
        })
    }

    fn publish(&self, snapshot: CatalogSnapshot) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        *state = Arc::new(snapshot);
    }

    /// Ranked keyword search over the current snapshot
    pub fn search(&self, keyword: &str) -> Vec<PluginRecord> {
        search::search(&self.snapshot().records, keyword)
    }

    /// Records by author substring over the current snapshot
    pub fn find_by_author(&self, author: &str) -> Vec<PluginRecord> {
        search::find_by_author(&self.snapshot().records, author)
    }

    /// Exact identifier resolution over the current snapshot
    pub fn resolve(&self, identifier: &str) -> Option<PluginRecord> {
        search::resolve(&self.snapshot().records, identifier).cloned()
    }
}

/// Parse, normalize, rank and number one mirror's index text
fn build_records(text: &str) -> Result<Vec<PluginRecord>, serde_json::Error> {
    let data: serde_json::Value = serde_json::from_str(text)?;
    let mut records = parse_index(&data);

    // Stable: equal star counts keep index order
    records.sort_by(|a, b| b.stars.cmp(&a.stars));
    for (i, record) in records.iter_mut().enumerate() {
        record.id = i + 1;
    }

    Ok(records)
}
