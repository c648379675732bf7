//! Repository URL parsing

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Owner/name pair identifying a repository on the hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// Tried in order; first match wins.
static REPO_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"github\.com/([^/]+)/([^/\s]+)",
        r"github\.com/([^/]+)/([^/\s]+)\.git",
        r"github\.com/([^/]+)/([^/\s]+)/.*",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Extract owner and name from a `github.com/<owner>/<name>` URL
///
/// Returns `None` when no pattern matches.
pub fn parse_repo_url(url: &str) -> Option<RepoRef> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    for pattern in REPO_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(url) {
            let owner = caps.get(1)?.as_str();
            let raw_name = caps.get(2)?.as_str();
            // The bare pattern also swallows a `.git` suffix
            let name = raw_name.strip_suffix(".git").unwrap_or(raw_name);
            if owner.is_empty() || name.is_empty() {
                continue;
            }
            return Some(RepoRef {
                owner: owner.to_string(),
                name: name.to_string(),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(url: &str) -> Option<(String, String)> {
        parse_repo_url(url).map(|r| (r.owner, r.name))
    }

    #[test]
    fn test_bare_url() {
        assert_eq!(
            parsed("https://github.com/Soulter/astrbot_plugin_weather"),
            Some(("Soulter".into(), "astrbot_plugin_weather".into()))
        );
    }

    #[test]
    fn test_git_suffix() {
        assert_eq!(
            parsed("https://github.com/alice/helper.git"),
            Some(("alice".into(), "helper".into()))
        );
    }

    #[test]
    fn test_trailing_segments() {
        assert_eq!(
            parsed("https://github.com/alice/helper/tree/main/src"),
            Some(("alice".into(), "helper".into()))
        );
    }

    #[test]
    fn test_unresolvable() {
        assert_eq!(parsed(""), None);
        assert_eq!(parsed("https://gitlab.com/alice/helper"), None);
        assert_eq!(parsed("https://github.com/alice"), None);
    }

    #[test]
    fn test_display() {
        let repo = parse_repo_url("github.com/a/b").unwrap();
        assert_eq!(repo.to_string(), "a/b");
    }
}
