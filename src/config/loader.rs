//! Configuration loading and validation
//!
//! Precedence order (highest to lowest):
//! 1. Environment variable overrides
//! 2. Root config file
//! 3. Built-in defaults

use super::{paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the root config file, if any, plus env overrides
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path())
    }

    /// Load configuration from `path` (defaults when absent) plus env overrides
    pub fn load_from(path: &Path) -> Result<Config> {
        let config = if path.exists() {
            Self::load_file(path)?
        } else {
            tracing::debug!("No config file at {}; using defaults", path.display());
            Config::default()
        };

        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate a loaded configuration
    ///
    /// Fails on:
    /// - An API base URL that is not an absolute http(s) URL
    /// - No catalog mirrors, or an http(s) mirror that does not parse
    /// - Zero request timeouts
    pub fn validate(config: &Config) -> Result<()> {
        check_http_url(&config.github.api_base_url)
            .context("github.apiBaseUrl is invalid")?;

        if config.github.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("github.requestTimeoutSecs must be greater than 0"));
        }

        if config.catalog.mirrors.is_empty() {
            return Err(anyhow::anyhow!("catalog.mirrors must list at least one source"));
        }

        for mirror in &config.catalog.mirrors {
            if mirror.trim().is_empty() {
                return Err(anyhow::anyhow!("catalog.mirrors contains an empty entry"));
            }
            if mirror.starts_with("http://") || mirror.starts_with("https://") {
                check_http_url(mirror)
                    .with_context(|| format!("catalog mirror '{}' is invalid", mirror))?;
            }
        }

        if config.catalog.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("catalog.requestTimeoutSecs must be greater than 0"));
        }

        Ok(())
    }

    /// Load and validate the configuration file at `path`
    pub fn validate_file(path: &Path) -> Result<Config> {
        let config = Self::load_from(path)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// `STARCAT_GITHUB_TOKEN` always wins; `GITHUB_TOKEN` only fills an empty token.
    pub fn apply_env_overrides(mut config: Config) -> Config {
        if let Ok(token) = std::env::var("STARCAT_GITHUB_TOKEN") {
            config.github.token = token;
        } else if config.github.token.is_empty() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                config.github.token = token;
            }
        }

        if let Ok(base_url) = std::env::var("STARCAT_API_BASE_URL") {
            config.github.api_base_url = base_url;
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

fn check_http_url(value: &str) -> Result<()> {
    let parsed = url::Url::parse(value).with_context(|| format!("'{}' is not a URL", value))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow::anyhow!("unsupported URL scheme '{}' in '{}'", other, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        ConfigLoader::validate(&Config::default()).unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.github.api_base_url = "not a url".to_string();
        assert!(ConfigLoader::validate(&config).is_err());

        let mut config = Config::default();
        config.catalog.mirrors.clear();
        assert!(ConfigLoader::validate(&config).is_err());

        let mut config = Config::default();
        config.catalog.mirrors = vec!["https://".to_string()];
        assert!(ConfigLoader::validate(&config).is_err());

        let mut config = Config::default();
        config.github.request_timeout_secs = 0;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_file_mirror_paths_are_accepted() {
        let mut config = Config::default();
        config.catalog.mirrors = vec!["./plugins.json".to_string(), "file:///tmp/p.json".to_string()];
        ConfigLoader::validate(&config).unwrap();
    }

    #[test]
    fn test_save_and_load_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.bulk.star_delay_ms = 50;
        ConfigLoader::save(&config, &path).unwrap();

        let loaded = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(loaded.bulk.star_delay_ms, 50);
    }

    #[test]
    fn test_load_file_reports_parse_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "github: [not, a, map]").unwrap();

        let err = ConfigLoader::load_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: set_var is unsafe in Rust 2024 due to potential data races.
        // No other test reads these variables.
        unsafe {
            std::env::set_var("STARCAT_GITHUB_TOKEN", "env-token");
            std::env::set_var("STARCAT_API_BASE_URL", "https://ghe.example.test/api/v3");
        }

        let config = ConfigLoader::apply_env_overrides(Config::default());

        assert_eq!(config.github.token, "env-token");
        assert_eq!(config.github.api_base_url, "https://ghe.example.test/api/v3");

        // SAFETY: see above
        unsafe {
            std::env::remove_var("STARCAT_GITHUB_TOKEN");
            std::env::remove_var("STARCAT_API_BASE_URL");
        }
    }
}
