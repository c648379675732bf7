//! CLI command handlers

use super::render;
use crate::access::guarded;
use crate::catalog::{PluginCatalog, PluginRecord};
use crate::config::{paths, Config, ConfigLoader};
use crate::github::{parse_repo_url, RepositoryClient};
use crate::reconcile::{
    check_star_status, plan_bulk_star, scan_star_status, star_unstarred, CancellationToken,
    InstalledItem, InstalledPlugin, InstalledReconciler, ReconciliationResult, StarStatus,
    StarTarget,
};
use anyhow::{Context, Result};
use clap::Subcommand;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the catalog (lists everything without a keyword)
    Search { keyword: Option<String> },
    /// List plugins by author
    Author { name: String },
    /// Show one plugin by id, short name or full name
    Show { identifier: String },
    /// Reload the catalog from its mirrors
    Update,
    /// Star a plugin's repository
    Star { identifier: String },
    /// Check whether a plugin's repository is starred
    Check { identifier: String },
    /// Show the account behind the configured token
    Whoami,
    /// Test connectivity to the hosting API
    Ping,
    /// Match installed plugins (JSON list) against the catalog
    Installed { file: PathBuf },
    /// Star every installed plugin found in the catalog
    StarInstalled { file: PathBuf },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Show configuration file path
    Path,
    /// Print the effective configuration (token masked)
    Show {
        /// Single key in dot notation (e.g., "catalog.mirrors")
        key: Option<String>,
    },
    /// Validate configuration
    Validate,
}

/// Dispatch a parsed command
///
/// `user` is the caller identity checked against `allowedUsers` for
/// account-affecting commands.
pub async fn run(command: Command, config_path: Option<&Path>, user: Option<&str>) -> Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(paths::root_config_path);

    let command = match command {
        Command::Config { subcommand } => return handle_config_command(subcommand, &config_path),
        Command::Version => {
            super::display_version();
            return Ok(());
        }
        other => other,
    };

    let config = ConfigLoader::load_from(&config_path).context("Failed to load configuration")?;
    let user = user.unwrap_or_default();
    tracing::debug!("Running {:?} as '{}'", command, user);

    match command {
        Command::Search { keyword } => {
            let catalog = load_catalog(&config).await?;
            println!("{}", render::render_list(&catalog.search(keyword.as_deref().unwrap_or(""))));
        }
        Command::Author { name } => {
            let catalog = load_catalog(&config).await?;
            println!("{}", render::render_list(&catalog.find_by_author(&name)));
        }
        Command::Show { identifier } => {
            let catalog = load_catalog(&config).await?;
            let record = resolve_or_suggest(&catalog, &identifier)?;
            println!("{}", render::render_record(&record));
        }
        Command::Update => {
            let catalog = PluginCatalog::from_config(&config.catalog)?;
            let count = catalog.load().await.context("Catalog update failed")?;
            println!(
                "Loaded {} plugins from {}",
                count,
                catalog.loaded_from().unwrap_or_default()
            );
        }
        Command::Star { identifier } => {
            guarded(&config.allowed_users, user, star_one(&config, &identifier)).await??;
        }
        Command::Check { identifier } => {
            let catalog = load_catalog(&config).await?;
            let record = resolve_or_suggest(&catalog, &identifier)?;
            let client = RepositoryClient::from_config(&config.github)?;
            let status = check_star_status(&client, &StarTarget::from(&record)).await;
            println!("{}: {}", record.name, render::render_status(status));
        }
        Command::Whoami => {
            let client = RepositoryClient::from_config(&config.github)?;
            let identity = guarded(&config.allowed_users, user, client.fetch_identity()).await??;
            println!("{}", render::render_identity(&identity));
        }
        Command::Ping => {
            let client = RepositoryClient::from_config(&config.github)?;
            let report = guarded(&config.allowed_users, user, client.probe_connectivity()).await?;
            println!("{}", render::render_connectivity(&report));
        }
        Command::Installed { file } => {
            let installed = read_installed(&file)?;
            let catalog = load_catalog(&config).await?;
            let reconciler = InstalledReconciler::new(&catalog);
            let results = reconciler.reconcile(&installed);
            let statuses = if config.github.token.trim().is_empty() {
                BTreeMap::new()
            } else {
                let client = RepositoryClient::from_config(&config.github)?;
                matched_statuses(&client, &results).await
            };
            println!("{}", render::render_reconciliation(&results, &statuses));
        }
        Command::StarInstalled { file } => {
            guarded(&config.allowed_users, user, star_installed(&config, &file)).await??;
        }
        Command::Config { .. } | Command::Version => {}
    }

    Ok(())
}

async fn load_catalog(config: &Config) -> Result<PluginCatalog> {
    let catalog = PluginCatalog::from_config(&config.catalog)?;
    catalog
        .refresh_if_stale()
        .await
        .context("Failed to load the plugin catalog")?;
    Ok(catalog)
}

fn resolve_or_suggest(catalog: &PluginCatalog, identifier: &str) -> Result<PluginRecord> {
    if let Some(record) = catalog.resolve(identifier) {
        return Ok(record);
    }

    let suggestions: Vec<String> = catalog
        .search(identifier)
        .iter()
        .take(5)
        .map(|r| r.short_name.clone())
        .collect();
    if suggestions.is_empty() {
        Err(anyhow::anyhow!("No plugin matches '{}'", identifier))
    } else {
        Err(anyhow::anyhow!(
            "No plugin matches '{}' exactly; did you mean: {}",
            identifier,
            suggestions.join(", ")
        ))
    }
}

/// Star status of every matched item, keyed by plugin id
async fn matched_statuses<T: InstalledItem>(
    client: &RepositoryClient,
    results: &[ReconciliationResult<'_, T>],
) -> BTreeMap<usize, StarStatus> {
    let targets: Vec<StarTarget> = results
        .iter()
        .filter_map(|r| r.matched.as_ref())
        .map(StarTarget::from)
        .collect();

    scan_star_status(client, &targets)
        .await
        .into_iter()
        .filter_map(|(target, status)| target.plugin_id.map(|id| (id, status)))
        .collect()
}

async fn star_one(config: &Config, identifier: &str) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let mut record = resolve_or_suggest(&catalog, identifier)?;
    let client = RepositoryClient::from_config(&config.github)?;
    println!("{}", star_record(&client, &mut record).await?);
    Ok(())
}

/// Check, then star one record, refreshing its star count around the request
async fn star_record(client: &RepositoryClient, record: &mut PluginRecord) -> Result<String> {
    let repo = parse_repo_url(&record.repo_url)
        .with_context(|| format!("Unrecognized repository URL: {}", record.repo_url))?;

    match check_star_status(client, &StarTarget::from(&*record)).await {
        StarStatus::Starred => return Ok(format!("{} is already starred", repo)),
        StarStatus::NotStarred => {}
        other => anyhow::bail!("Cannot star {}: {}", repo, other),
    }

    client.refresh_star_count(record).await;
    let before = record.stars;
    if !client.set_starred(&repo.owner, &repo.name).await {
        anyhow::bail!("Failed to star {}", repo);
    }
    client.refresh_star_count(record).await;

    Ok(format!("Starred {} ({} -> {} stars)", repo, before, record.stars))
}

async fn star_installed(config: &Config, file: &Path) -> Result<()> {
    let installed = read_installed(file)?;
    let catalog = load_catalog(config).await?;
    let reconciler = InstalledReconciler::new(&catalog);
    let results = reconciler.reconcile(&installed);
    let targets = plan_bulk_star(&results, reconciler.records(), &config.bulk.self_plugin_name);

    if targets.is_empty() {
        println!("No installed plugins found in the catalog");
        return Ok(());
    }
    println!(
        "Checking and starring {} repositories (Ctrl-C stops after the current one)",
        targets.len()
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let client = RepositoryClient::from_config(&config.github)?;
    if !client.verify_credential().await {
        anyhow::bail!("The configured GitHub token was rejected; check github.token");
    }

    let report = star_unstarred(
        &client,
        &targets,
        Duration::from_millis(config.bulk.star_delay_ms),
        &cancel,
    )
    .await;
    watcher.abort();

    println!("{}", render::render_bulk_report(&report));
    Ok(())
}

fn read_installed(path: &Path) -> Result<Vec<InstalledPlugin>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read installed list: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse installed list: {}", path.display()))
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand, path: &Path) -> Result<()> {
    match cmd {
        ConfigSubcommand::Path => {
            println!("{}", path.display());
        }
        ConfigSubcommand::Show { key } => {
            let mut config = ConfigLoader::load_from(path).context("Failed to load configuration")?;
            if let Some(key) = key {
                println!("{}", crate::config::get_config_value(&config, &key)?);
            } else {
                config.github.token = crate::config::mask_token(&config.github.token);
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::validate_file(path).context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}
