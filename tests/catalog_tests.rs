//! Catalog loading, ranking, search and resolution through the public API

use anyhow::Result;
use async_trait::async_trait;
use starcat::catalog::{
    short_name, CatalogError, FileMirror, MirrorSource, PluginCatalog, PluginRecord,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

const INDEX: &str = r#"{
    "astrbot_plugin_weather": {"author": "alice", "desc": "Current conditions", "stars": 10},
    "astrbot_plugin_weather_pro": {"author": "bob", "description": "Forecasts", "stars": 50},
    "astrbot_plugin_context": {"author": "carol", "repo": "https://github.com/carol/astrbot_plugin_context", "stars": 30, "tags": ["memory"]},
    "plugin_5g_status": {"author": "dave", "stars": 5, "topics": ["network", 7]},
    "astrbot_plugin_nameless_repo": {"stars": 100}
}"#;

/// Serves a scripted sequence of payloads and counts fetches
struct ScriptedMirror {
    payloads: Vec<Result<String, String>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedMirror {
    fn new(payloads: Vec<Result<&str, &str>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mirror = Self {
            payloads: payloads
                .into_iter()
                .map(|p| p.map(str::to_string).map_err(str::to_string))
                .collect(),
            calls: Arc::clone(&calls),
        };
        (mirror, calls)
    }
}

#[async_trait]
impl MirrorSource for ScriptedMirror {
    async fn fetch(&self) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let payload = self
            .payloads
            .get(n)
            .or_else(|| self.payloads.last())
            .cloned()
            .unwrap_or_else(|| Err("no payload".to_string()));
        payload.map_err(|e| anyhow::anyhow!(e))
    }

    fn location(&self) -> String {
        "scripted".to_string()
    }
}

fn index_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

async fn loaded_catalog() -> PluginCatalog {
    let (mirror, _) = ScriptedMirror::new(vec![Ok(INDEX)]);
    let catalog = PluginCatalog::new(vec![Box::new(mirror)]);
    catalog.load().await.unwrap();
    catalog
}

#[tokio::test]
async fn test_entries_without_resolvable_repository_are_skipped() {
    let catalog = loaded_catalog().await;
    assert_eq!(catalog.len(), 4);
    assert!(catalog.resolve("astrbot_plugin_nameless_repo").is_none());
}

#[tokio::test]
async fn test_ids_follow_star_ranking() {
    let catalog = loaded_catalog().await;
    let ranked: Vec<(usize, String)> = catalog
        .records()
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect();

    assert_eq!(
        ranked,
        vec![
            (1, "astrbot_plugin_weather_pro".to_string()),
            (2, "astrbot_plugin_context".to_string()),
            (3, "astrbot_plugin_weather".to_string()),
            (4, "plugin_5g_status".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_entry_normalization() {
    let catalog = loaded_catalog().await;

    let weather = catalog.resolve("weather").unwrap();
    assert_eq!(weather.repo_url, "https://github.com/alice/astrbot_plugin_weather");
    assert_eq!(weather.description, "Current conditions");
    assert_eq!(weather.language, "Python");

    let status = catalog.resolve("5g_status").unwrap();
    assert_eq!(status.tags.iter().collect::<Vec<_>>(), vec!["network"]);
}

#[tokio::test]
async fn test_two_weathers_search_order() {
    let (mirror, _) = ScriptedMirror::new(vec![Ok(r#"{
        "astrbot_plugin_weather": {"author": "alice", "stars": 10},
        "astrbot_plugin_weather_pro": {"author": "bob", "stars": 50}
    }"#)]);
    let catalog = PluginCatalog::new(vec![Box::new(mirror)]);
    catalog.load().await.unwrap();

    assert_eq!(catalog.get(1).unwrap().name, "astrbot_plugin_weather_pro");
    assert_eq!(catalog.get(2).unwrap().name, "astrbot_plugin_weather");

    let ids: Vec<usize> = catalog.search("weather").iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_search_empty_and_unmatched() {
    let catalog = loaded_catalog().await;
    assert_eq!(catalog.search(""), catalog.records());
    assert!(catalog.search("zzz_no_such_token").is_empty());
}

#[tokio::test]
async fn test_find_by_author_is_case_insensitive() {
    let catalog = loaded_catalog().await;
    let names: Vec<String> = catalog
        .find_by_author("CAROL")
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["astrbot_plugin_context"]);
}

#[tokio::test]
async fn test_resolve_numeric_is_id_only() {
    let catalog = loaded_catalog().await;
    // Four records: id 5 does not exist even though a name contains "5"
    assert!(catalog.resolve("5").is_none());
    assert_eq!(catalog.resolve("4").unwrap().name, "plugin_5g_status");
}

#[tokio::test]
async fn test_resolve_is_exact() {
    let catalog = loaded_catalog().await;
    assert_eq!(catalog.resolve("CONTEXT").unwrap().author, "carol");
    assert!(catalog.resolve("contex").is_none());
    assert!(catalog.resolve("weather_pr").is_none());
}

#[test]
fn test_short_name_is_capped() {
    assert_eq!(
        short_name("astrbot_plugin_weather_forecast_today"),
        "weather_forecast_today".chars().take(15).collect::<String>()
    );
}

#[tokio::test]
async fn test_failed_reload_keeps_records_and_timestamp() {
    let (mirror, calls) = ScriptedMirror::new(vec![Ok(INDEX), Err("connection reset")]);
    let catalog = PluginCatalog::new(vec![Box::new(mirror)]).with_staleness_window(Duration::ZERO);

    catalog.load().await.unwrap();
    let before = catalog.snapshot();

    let err = catalog.load().await.unwrap_err();
    assert_eq!(err, CatalogError::AllSourcesFailed { attempted: 1 });
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let after = catalog.snapshot();
    assert_eq!(after.records, before.records);
    assert_eq!(after.refreshed_at, before.refreshed_at);
    assert_eq!(after.loaded_at, before.loaded_at);
}

#[tokio::test]
async fn test_mirrors_tried_in_order_without_merging() {
    let (broken, broken_calls) = ScriptedMirror::new(vec![Ok("<html>rate limited</html>")]);
    let primary = index_file(r#"[{"name": "only_here", "author": "x", "stars": 1}]"#);
    let (unused, unused_calls) = ScriptedMirror::new(vec![Ok(INDEX)]);

    let catalog = PluginCatalog::new(vec![
        Box::new(broken),
        Box::new(FileMirror::new(primary.path())),
        Box::new(unused),
    ]);

    assert_eq!(catalog.load().await.unwrap(), 1);
    assert_eq!(broken_calls.load(Ordering::SeqCst), 1);
    assert_eq!(unused_calls.load(Ordering::SeqCst), 0);

    let only: Vec<PluginRecord> = catalog.records();
    assert_eq!(only[0].name, "only_here");
    assert_eq!(only[0].repo_url, "https://github.com/x/only_here");
}

#[tokio::test]
async fn test_refresh_if_stale_skips_fresh_catalog() {
    let (mirror, calls) = ScriptedMirror::new(vec![Ok(INDEX)]);
    let catalog = PluginCatalog::new(vec![Box::new(mirror)]);

    assert!(catalog.refresh_if_stale().await.unwrap());
    assert!(!catalog.refresh_if_stale().await.unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
