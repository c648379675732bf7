//! File mirror source (for testing and offline use)

use super::connector::MirrorSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads the plugin index from a local JSON file
pub struct FileMirror {
    file_path: PathBuf,
}

impl FileMirror {
    /// Create a new file mirror
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        let file_path = file_path.into();
        tracing::debug!("Created file mirror: {:?}", file_path);
        Self { file_path }
    }
}

#[async_trait]
impl MirrorSource for FileMirror {
    async fn fetch(&self) -> Result<String> {
        tracing::debug!("Reading index from file: {:?}", self.file_path);

        tokio::fs::read_to_string(&self.file_path)
            .await
            .with_context(|| format!("Failed to read file: {:?}", self.file_path))
    }

    fn location(&self) -> String {
        self.file_path.display().to_string()
    }
}
