//! Keyword search, author filter, and exact identifier resolution
//!
//! All functions operate on a star-descending record slice as published by
//! [`PluginCatalog`](super::PluginCatalog).

use super::record::PluginRecord;

const NAME_MATCH: u32 = 10;
const NAME_EXACT_BONUS: u32 = 20;
const DESCRIPTION_MATCH: u32 = 5;
const AUTHOR_MATCH: u32 = 8;
const TAG_MATCH: u32 = 3;

/// Relevance of a record for an already-lowercased keyword
pub fn score(record: &PluginRecord, keyword_lower: &str) -> u32 {
    let mut score = 0;

    let name = record.name.to_lowercase();
    if name.contains(keyword_lower) {
        score += NAME_MATCH;
        if name == keyword_lower {
            score += NAME_EXACT_BONUS;
        }
    }

    if record.description.to_lowercase().contains(keyword_lower) {
        score += DESCRIPTION_MATCH;
    }

    if record.author.to_lowercase().contains(keyword_lower) {
        score += AUTHOR_MATCH;
    }

    // At most one tag counts
    if record
        .tags
        .iter()
        .any(|tag| tag.to_lowercase().contains(keyword_lower))
    {
        score += TAG_MATCH;
    }

    score
}

/// Ranked keyword search
///
/// An empty keyword returns every record in catalog order. Otherwise records
/// scoring zero are dropped and the rest are ordered by score, then stars;
/// the sort is stable so remaining ties keep catalog order.
pub fn search(records: &[PluginRecord], keyword: &str) -> Vec<PluginRecord> {
    if keyword.is_empty() {
        return records.to_vec();
    }

    let keyword_lower = keyword.to_lowercase();
    let mut scored: Vec<(u32, &PluginRecord)> = records
        .iter()
        .map(|record| (score(record, &keyword_lower), record))
        .filter(|(score, _)| *score > 0)
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b.cmp(score_a).then_with(|| b.stars.cmp(&a.stars))
    });

    scored.into_iter().map(|(_, record)| record.clone()).collect()
}

/// Records whose author contains `author` (case-insensitive), star-descending
pub fn find_by_author(records: &[PluginRecord], author: &str) -> Vec<PluginRecord> {
    if author.is_empty() {
        return Vec::new();
    }

    let author_lower = author.to_lowercase();
    let mut matches: Vec<PluginRecord> = records
        .iter()
        .filter(|record| record.author.to_lowercase().contains(&author_lower))
        .cloned()
        .collect();
    matches.sort_by(|a, b| b.stars.cmp(&a.stars));
    matches
}

/// Exact-only identifier resolution
///
/// Tried in order: numeric id, short name, full name (both case-insensitive).
/// There is deliberately no substring fallback; use [`search`] for that.
pub fn resolve<'a>(records: &'a [PluginRecord], identifier: &str) -> Option<&'a PluginRecord> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return None;
    }

    if identifier.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(id) = identifier.parse::<usize>() {
            if let Some(record) = records.iter().find(|r| r.id == id) {
                return Some(record);
            }
        }
    }

    let identifier_lower = identifier.to_lowercase();

    records
        .iter()
        .find(|r| r.short_name.to_lowercase() == identifier_lower)
        .or_else(|| {
            records
                .iter()
                .find(|r| r.name.to_lowercase() == identifier_lower)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(mut records: Vec<PluginRecord>) -> Vec<PluginRecord> {
        records.sort_by(|a, b| b.stars.cmp(&a.stars));
        for (i, record) in records.iter_mut().enumerate() {
            record.id = i + 1;
        }
        records
    }

    fn sample() -> Vec<PluginRecord> {
        ranked(vec![
            PluginRecord::new("astrbot_plugin_weather", "alice", "Current conditions", "https://github.com/alice/astrbot_plugin_weather", 10),
            PluginRecord::new("astrbot_plugin_weather_pro", "bob", "Forecasts", "https://github.com/bob/astrbot_plugin_weather_pro", 50),
            PluginRecord::new("astrbot_plugin_context", "carol", "Context memory", "https://github.com/carol/astrbot_plugin_context", 30)
                .with_tags(["memory", "llm"]),
            PluginRecord::new("plugin_5g_status", "dave", "Signal checker", "https://github.com/dave/plugin_5g_status", 5),
        ])
    }

    fn names(records: &[PluginRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_score_components() {
        let records = sample();
        let context = records.iter().find(|r| r.short_name == "context").unwrap();

        assert_eq!(score(context, "astrbot_plugin_context"), 30);
        assert_eq!(score(context, "context"), 15);
        assert_eq!(score(context, "carol"), 8);
        assert_eq!(score(context, "llm"), 3);
        assert_eq!(score(context, "m"), 5 + 3);
    }

    #[test]
    fn test_search_empty_returns_catalog_order() {
        let records = sample();
        assert_eq!(search(&records, ""), records);
    }

    #[test]
    fn test_search_no_match() {
        assert!(search(&sample(), "zzz_no_such_token").is_empty());
    }

    #[test]
    fn test_search_ties_broken_by_stars() {
        let result = search(&sample(), "weather");
        assert_eq!(
            names(&result),
            vec!["astrbot_plugin_weather_pro", "astrbot_plugin_weather"]
        );
        assert_eq!(result[0].id, 1);
    }

    #[test]
    fn test_search_exact_name_outranks_stars() {
        let result = search(&sample(), "ASTRBOT_PLUGIN_WEATHER");
        assert_eq!(result[0].name, "astrbot_plugin_weather");
    }

    #[test]
    fn test_find_by_author() {
        let records = sample();
        assert_eq!(names(&find_by_author(&records, "ALI")), vec!["astrbot_plugin_weather"]);
        assert!(find_by_author(&records, "").is_empty());
    }

    #[test]
    fn test_resolve_by_id_only_matches_id() {
        let records = sample();
        // "5" appears in a name but no record has id 5
        assert!(resolve(&records, "5").is_none());
        assert_eq!(resolve(&records, " 2 ").unwrap().short_name, "context");
    }

    #[test]
    fn test_resolve_exact_names() {
        let records = sample();
        assert_eq!(resolve(&records, "Context").unwrap().id, 2);
        assert_eq!(
            resolve(&records, "astrbot_plugin_weather").unwrap().name,
            "astrbot_plugin_weather"
        );
        assert!(resolve(&records, "cont").is_none());
        assert!(resolve(&records, "").is_none());
    }
}
