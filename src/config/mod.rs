//! Configuration system for starcat
//!
//! A single YAML file under the platform config directory, with built-in
//! defaults for every key and environment overrides for credentials.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{BulkConfig, CatalogConfig, Config, GithubConfig};

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "github.token" => Ok(mask_token(&config.github.token)),
        "github.apiBaseUrl" => Ok(config.github.api_base_url.clone()),
        "github.requestTimeoutSecs" => Ok(config.github.request_timeout_secs.to_string()),
        "github.maxRetries" => Ok(config.github.max_retries.to_string()),
        "github.userAgent" => Ok(config.github.user_agent.clone()),
        "catalog.mirrors" => serde_yaml::to_string(&config.catalog.mirrors)
            .map_err(|e| anyhow::anyhow!("Failed to serialize catalog.mirrors: {}", e)),
        "catalog.requestTimeoutSecs" => Ok(config.catalog.request_timeout_secs.to_string()),
        "catalog.stalenessSecs" => Ok(config.catalog.staleness_secs.to_string()),
        "bulk.starDelayMs" => Ok(config.bulk.star_delay_ms.to_string()),
        "bulk.selfPluginName" => Ok(config.bulk.self_plugin_name.clone()),
        "allowedUsers" => Ok(config
            .allowed_users
            .iter()
            .collect::<Vec<_>>()
            .join(",")),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Show only the last four characters of a credential
pub fn mask_token(token: &str) -> String {
    if token.is_empty() {
        return "(not set)".to_string();
    }
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
