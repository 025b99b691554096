use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::Result;

/// Reads JSON documents from disk.
///
/// The whole file is read and its handle closed before parsing, so nothing
/// stays open once a document has been handed to the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load and parse the JSON document at `path`
    pub async fn load(&self, path: &Path) -> Result<Value> {
        debug!(path = %path.display(), "loading document");
        let content = tokio::fs::read_to_string(path).await?;
        let document = serde_json::from_str(&content)?;
        Ok(document)
    }
}
