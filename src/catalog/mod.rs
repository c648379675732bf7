// Plugin catalog for starcat
//
// Loads the community plugin index from mirrors, normalizes entries into
// ranked records, and answers search and lookup queries.

pub mod record;
pub mod search;
pub mod source;
pub mod store;

pub use record::{parse_index, short_name, PluginRecord};
pub use source::{create_mirror, FileMirror, HttpMirror, MirrorSource};
pub use store::{CatalogSnapshot, PluginCatalog, DEFAULT_STALENESS_WINDOW};

/// Catalog errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("No catalog mirrors configured")]
    NoSources,

    #[error("All {attempted} catalog mirror(s) failed to yield any plugin")]
    AllSourcesFailed { attempted: usize },
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
