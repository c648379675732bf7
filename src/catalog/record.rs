//! Plugin records and index entry normalization
//!
//! The remote index is loosely shaped: entries come either as a mapping of
//! plugin name to fields or as a list of objects, and several fields have two
//! accepted spellings. Everything is normalized into [`PluginRecord`] here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Author used when an entry carries none
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Language tag used when an entry carries none
pub const DEFAULT_LANGUAGE: &str = "Python";

/// Prefixes stripped (first match only, case-insensitive) when deriving short names
pub const SHORT_NAME_PREFIXES: [&str; 3] = ["astrbot_plugin_", "astrbot_", "plugin_"];

/// Maximum short name length in characters
pub const SHORT_NAME_MAX_LEN: usize = 15;

/// A normalized catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRecord {
    /// Ranking label assigned after a complete load (1-based, star-descending).
    /// Not durable: a reload may give the same id to a different record.
    pub id: usize,
    pub name: String,
    pub author: String,
    pub description: String,
    pub repo_url: String,
    pub stars: u64,
    pub language: String,
    pub tags: BTreeSet<String>,
    pub short_name: String,
}

impl PluginRecord {
    /// Create a record with default language and no tags
    pub fn new(name: &str, author: &str, description: &str, repo_url: &str, stars: u64) -> Self {
        let author = author.trim();
        Self {
            id: 0,
            name: name.to_string(),
            author: if author.is_empty() {
                UNKNOWN_AUTHOR.to_string()
            } else {
                author.to_string()
            },
            description: description.to_string(),
            repo_url: repo_url.to_string(),
            stars,
            language: DEFAULT_LANGUAGE.to_string(),
            tags: BTreeSet::new(),
            short_name: short_name(name),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Normalize one index entry
    ///
    /// `key_name` is the mapping key for mapping-shaped indexes and takes
    /// precedence over any `name` field. Returns `None` when the entry has no
    /// usable name or no resolvable repository URL.
    pub fn from_entry(key_name: Option<&str>, entry: &Map<String, Value>) -> Option<Self> {
        let name = key_name
            .map(str::to_string)
            .or_else(|| string_field(entry, &["name"]))
            .unwrap_or_default();
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let author = string_field(entry, &["author"]).unwrap_or_default();
        let author = author.trim();
        let description = string_field(entry, &["desc", "description"]).unwrap_or_default();

        let mut repo_url = string_field(entry, &["repo", "repository"])
            .unwrap_or_default()
            .trim()
            .to_string();
        if repo_url.is_empty() && !author.is_empty() {
            repo_url = format!("https://github.com/{}/{}", author, name);
        }
        if repo_url.is_empty() {
            return None;
        }

        let language = string_field(entry, &["language"])
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let record = PluginRecord::new(name, author, description.trim(), &repo_url, star_count(entry))
            .with_language(&language)
            .with_tags(tag_list(entry));

        Some(record)
    }
}

/// Derive the display alias: strip the first matching prefix, then cap the length
pub fn short_name(name: &str) -> String {
    let stripped = SHORT_NAME_PREFIXES
        .iter()
        .find(|prefix| {
            name.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
        .and_then(|prefix| name.get(prefix.len()..))
        .unwrap_or(name);

    stripped.chars().take(SHORT_NAME_MAX_LEN).collect()
}

/// Normalize a whole parsed index document
///
/// Accepts a mapping of name to fields or a list of field objects. Entries
/// that fail normalization are skipped.
pub fn parse_index(data: &Value) -> Vec<PluginRecord> {
    let mut records = Vec::new();

    match data {
        Value::Object(map) => {
            for (name, fields) in map {
                match fields {
                    Value::Object(entry) => {
                        if let Some(record) = PluginRecord::from_entry(Some(name.as_str()), entry) {
                            records.push(record);
                        }
                    }
                    _ => tracing::warn!("Skipping index entry '{}': not an object", name),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(entry) => {
                        if let Some(record) = PluginRecord::from_entry(None, entry) {
                            records.push(record);
                        }
                    }
                    _ => tracing::warn!("Skipping index list item: not an object"),
                }
            }
        }
        _ => tracing::warn!("Index document is neither a mapping nor a list"),
    }

    records
}

/// First of `keys` that holds a string value
fn string_field(entry: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn star_count(entry: &Map<String, Value>) -> u64 {
    match entry.get("stars") {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    }
}

fn tag_list(entry: &Map<String, Value>) -> Vec<String> {
    ["tags", "topics"]
        .iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_array))
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test entry must be an object"),
        }
    }

    #[test]
    fn test_short_name_strips_first_prefix_and_truncates() {
        assert_eq!(
            short_name("astrbot_plugin_weather_forecast_today"),
            &"weather_forecast_today"[..15]
        );
        assert_eq!(short_name("ASTRBOT_PLUGIN_Music"), "Music");
        assert_eq!(short_name("astrbot_helper"), "helper");
        assert_eq!(short_name("plugin_plugin_x"), "plugin_x");
        assert_eq!(short_name("context"), "context");
    }

    #[test]
    fn test_short_name_counts_characters() {
        assert_eq!(short_name("天气预报插件天气预报插件天气预报插件").chars().count(), 15);
    }

    #[test]
    fn test_from_entry_accepts_field_variants() {
        let record = PluginRecord::from_entry(
            Some("astrbot_plugin_weather"),
            &entry(json!({
                "desc": "Weather lookup",
                "repo": "https://github.com/alice/astrbot_plugin_weather",
                "author": "alice",
                "stars": 12,
                "topics": ["weather", "tools", 7]
            })),
        )
        .unwrap();

        assert_eq!(record.description, "Weather lookup");
        assert_eq!(record.repo_url, "https://github.com/alice/astrbot_plugin_weather");
        assert_eq!(record.stars, 12);
        assert_eq!(record.language, DEFAULT_LANGUAGE);
        assert_eq!(record.short_name, "weather");
        assert_eq!(record.tags.len(), 2);
        assert!(record.tags.contains("tools"));
    }

    #[test]
    fn test_from_entry_synthesizes_repo_url() {
        let record = PluginRecord::from_entry(
            None,
            &entry(json!({"name": " music ", "author": "bob", "description": "Music"})),
        )
        .unwrap();

        assert_eq!(record.name, "music");
        assert_eq!(record.repo_url, "https://github.com/bob/music");
    }

    #[test]
    fn test_from_entry_rejects_unresolvable() {
        assert!(PluginRecord::from_entry(None, &entry(json!({"name": "   "}))).is_none());
        assert!(PluginRecord::from_entry(None, &entry(json!({"name": "orphan"}))).is_none());
    }

    #[test]
    fn test_from_entry_defaults() {
        let record = PluginRecord::from_entry(
            Some("x"),
            &entry(json!({"repository": "https://github.com/c/x", "stars": -3})),
        )
        .unwrap();
        assert_eq!(record.author, UNKNOWN_AUTHOR);
        assert_eq!(record.stars, 0);
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_parse_index_both_shapes() {
        let mapping = json!({
            "a": {"repo": "https://github.com/x/a"},
            "b": "not an object",
            "c": {"author": "y"}
        });
        let names: Vec<_> = parse_index(&mapping).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "c"]);

        let list = json!([
            {"name": "a", "repo": "https://github.com/x/a"},
            {"repo": "https://github.com/x/nameless"},
            42
        ]);
        assert_eq!(parse_index(&list).len(), 1);

        assert!(parse_index(&json!("scalar")).is_empty());
    }
}
