//! Content loading from the local filesystem or over HTTP.
//!
//! Two schemes only: a local path (absolute, or resolved against the
//! configurable root directory) or an `http://`/`https://` URL.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Client;

use crate::error::HubError;

/// How a piece of content was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Local filesystem read.
    File,
    /// HTTP(S) fetch.
    Http,
}

/// Raw text resolved from a location.
#[derive(Debug, Clone)]
pub struct LoadedContent {
    pub protocol: Protocol,
    pub content: String,
}

/// Resolves location strings to raw text.
#[derive(Clone)]
pub struct ContentLoader {
    root: Arc<RwLock<PathBuf>>,
    client: Client,
}

impl Default for ContentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentLoader {
    /// Create a loader rooted at the current working directory.
    pub fn new() -> Self {
        let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            root: Arc::new(RwLock::new(root)),
            client: Client::new(),
        }
    }

    /// The directory relative paths resolve against.
    pub fn root_dir(&self) -> PathBuf {
        self.root.read().clone()
    }

    /// Set the root directory. Must be an absolute path to an existing directory.
    pub fn set_root_dir(&self, path: impl Into<PathBuf>) -> Result<(), HubError> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(HubError::InvalidArgument(format!(
                "the root directory must be an absolute path: {}",
                path.display()
            )));
        }
        if !path.is_dir() {
            return Err(HubError::InvalidArgument(format!(
                "the root directory is not a directory: {}",
                path.display()
            )));
        }

        *self.root.write() = path;
        Ok(())
    }

    /// Resolve a location string to its text content.
    pub async fn load(&self, location: &str) -> Result<LoadedContent, HubError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            Ok(LoadedContent {
                protocol: Protocol::Http,
                content: self.load_http(location).await?,
            })
        } else {
            Ok(LoadedContent {
                protocol: Protocol::File,
                content: self.load_file(location).await?,
            })
        }
    }

    async fn load_file(&self, location: &str) -> Result<String, HubError> {
        let path = Path::new(location);
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.read().join(path)
        };

        let metadata = tokio::fs::metadata(&resolved)
            .await
            .map_err(|_| HubError::NotFound(resolved.clone()))?;
        if metadata.is_dir() {
            return Err(HubError::NotFound(resolved));
        }

        Ok(tokio::fs::read_to_string(&resolved).await?)
    }

    async fn load_http(&self, url: &str) -> Result<String, HubError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HubError::RemoteFetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
