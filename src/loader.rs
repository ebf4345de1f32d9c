//! Data loader - fetch and parse a dataset hierarchy
//!
//! A dataset is one JSON document:
//! `{ name, children: [{ name, children: [{ name, value }, ...] }, ...] }`

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Config;
use crate::hierarchy::Node;

#[derive(Error, Debug)]
pub enum DataFetchError {
    #[error("Unknown dataset '{0}'")]
    UnknownDataset(String),
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Invalid dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Malformed dataset: {0}")]
    Malformed(String),
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve `key` in the registry and fetch its dataset
pub async fn load(config: &Config, key: &str) -> Result<Node, DataFetchError> {
    let dataset = config
        .dataset(key)
        .ok_or_else(|| DataFetchError::UnknownDataset(key.to_string()))?;
    tracing::info!("Loading dataset '{}'", key);
    fetch(&dataset.url).await
}

/// GET `url` and parse the body as a dataset
pub async fn fetch(url: &str) -> Result<Node, DataFetchError> {
    tracing::debug!("Fetching from: {}", url);

    let transport = |source| DataFetchError::Transport {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::new();
    let response = client.get(url)
        .header("User-Agent", "TreemapViewer/0.1")
        .send()
        .await
        .map_err(transport)?;

    if !response.status().is_success() {
        return Err(DataFetchError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let body = response.bytes().await.map_err(transport)?;
    tracing::debug!("Downloaded {} bytes of JSON", body.len());

    parse_dataset(&body)
}

/// Read a dataset from a local JSON file
pub fn load_file(path: &Path) -> Result<Node, DataFetchError> {
    tracing::info!("Reading dataset from {:?}", path);
    let bytes = std::fs::read(path).map_err(|source| DataFetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dataset(&bytes)
}

/// Parse and check a dataset document.
///
/// The root must have at least one category and no leaf may be negative.
pub fn parse_dataset(bytes: &[u8]) -> Result<Node, DataFetchError> {
    let root: Node = serde_json::from_slice(bytes)?;

    if root.children.is_empty() {
        return Err(DataFetchError::Malformed(format!("'{}' has no categories", root.name)));
    }
    if let Some(bad) = first_negative_leaf(&root) {
        return Err(DataFetchError::Malformed(format!("leaf '{}' has a negative value", bad.name)));
    }

    tracing::debug!(
        "Parsed dataset '{}': {} categories, {} leaves, height {}, total {}",
        root.name,
        root.children.len(),
        root.leaf_count(),
        root.height(),
        root.total()
    );
    Ok(root)
}

fn first_negative_leaf(node: &Node) -> Option<&Node> {
    if node.is_leaf() {
        return node.value.filter(|v| *v < 0.0).map(|_| node);
    }
    node.children.iter().find_map(first_negative_leaf)
}
