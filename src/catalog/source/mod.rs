//! Catalog mirror sources
//!
//! Provides sources for fetching the raw plugin index:
//! - HTTP(S) mirrors (raw GitHub, CDN)
//! - Local files (for testing and offline use)

mod connector;
mod file;
mod http;

pub use connector::{create_mirror, MirrorSource};
pub use file::FileMirror;
pub use http::HttpMirror;
