//! Mirror source trait and factory

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// One location serving the plugin index
#[async_trait]
pub trait MirrorSource: Send + Sync {
    /// Fetch the raw index text
    async fn fetch(&self) -> Result<String>;

    /// Human-readable location, used in logs
    fn location(&self) -> String;
}

/// Create a mirror from a configured location
///
/// `http(s)://` locations become [`HttpMirror`](super::HttpMirror)s;
/// `file://` URLs and bare paths become [`FileMirror`](super::FileMirror)s.
pub fn create_mirror(location: &str, timeout: Duration) -> Result<Box<dyn MirrorSource>> {
    tracing::debug!("Creating mirror source: {}", location);

    match Url::parse(location) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            Ok(Box::new(super::http::HttpMirror::new(url.as_str(), timeout)?))
        }
        Ok(url) if url.scheme() == "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| anyhow::anyhow!("Invalid file URL: {}", location))?;
            Ok(Box::new(super::file::FileMirror::new(path)))
        }
        Ok(url) => anyhow::bail!("Unsupported mirror scheme '{}': {}", url.scheme(), location),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Ok(Box::new(super::file::FileMirror::new(PathBuf::from(location))))
        }
        Err(e) => Err(e).with_context(|| format!("Invalid mirror location: {}", location)),
    }
}
