//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use crate::access::AllowList;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

pub const DEFAULT_MIRRORS: [&str; 2] = [
    "https://raw.githubusercontent.com/AstrBotDevs/AstrBot_Plugins_Collection/main/plugins.json",
    "https://cdn.jsdelivr.net/gh/AstrBotDevs/AstrBot_Plugins_Collection@main/plugins.json",
];

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Hosting API access
    #[serde(default)]
    pub github: GithubConfig,

    /// Plugin index sources
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Bulk star behavior
    #[serde(default)]
    pub bulk: BulkConfig,

    /// Users permitted to run account-affecting commands (empty = everyone)
    #[serde(default, skip_serializing_if = "AllowList::is_empty")]
    pub allowed_users: AllowList,
}

/// Hosting API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GithubConfig {
    /// Personal access token
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_github_timeout")]
    pub request_timeout_secs: u64,

    /// Retry budget exposed to callers; the client itself never retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    /// Index mirrors, tried in order
    #[serde(default = "default_mirrors")]
    pub mirrors: Vec<String>,

    #[serde(default = "default_catalog_timeout")]
    pub request_timeout_secs: u64,

    /// Minimum catalog age before a refresh
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,
}

/// Bulk star configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BulkConfig {
    /// Pause between consecutive star requests
    #[serde(default = "default_star_delay_ms")]
    pub star_delay_ms: u64,

    /// Catalog name of this tool, always included in bulk star runs
    #[serde(default = "default_self_plugin_name")]
    pub self_plugin_name: String,
}

// Default value functions
fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_github_timeout() -> u64 {
    20
}

fn default_max_retries() -> u32 {
    3
}

fn default_user_agent() -> String {
    format!("starcat/{}", env!("CARGO_PKG_VERSION"))
}

fn default_mirrors() -> Vec<String> {
    DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect()
}

fn default_catalog_timeout() -> u64 {
    10
}

fn default_staleness_secs() -> u64 {
    3600
}

fn default_star_delay_ms() -> u64 {
    500
}

fn default_self_plugin_name() -> String {
    "github_star_manager".to_string()
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_github_timeout(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            mirrors: default_mirrors(),
            request_timeout_secs: default_catalog_timeout(),
            staleness_secs: default_staleness_secs(),
        }
    }
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            star_delay_ms: default_star_delay_ms(),
            self_plugin_name: default_self_plugin_name(),
        }
    }
}
