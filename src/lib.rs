//! starcat library
//!
//! Catalog discovery, star management and installed-plugin reconciliation
//! for AstrBot plugins hosted on GitHub. Used by the `starcat` binary and
//! by integration tests.

pub mod access;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod github;
pub mod reconcile;

// Re-export commonly used types for convenience
pub use access::{guarded, AccessDenied, AllowList};
pub use catalog::{CatalogError, PluginCatalog, PluginRecord};
pub use github::{ErrorKind, HostingError, RepositoryClient};
pub use reconcile::{InstalledItem, InstalledPlugin, InstalledReconciler};
