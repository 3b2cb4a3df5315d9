//! Retrieval of API description documents over HTTP or from disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use apidex_core::bundle::DocumentLoader;
use apidex_core::config::FetchConfig;
use apidex_core::error::{BundleError, ParseError};
use apidex_core::parse::value_from_str;
use reqwest::header::ACCEPT;
use serde_json::Value;
use thiserror::Error;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse document from {location}: {source}")]
    Content {
        location: String,
        #[source]
        source: ParseError,
    },
}

/// Transport settings for remote documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl From<FetchConfig> for FetchOptions {
    fn from(config: FetchConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Whether `location` names an `http(s)` URL rather than a file.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// GET `url` with `Accept: application/json` and parse the body as JSON or
/// YAML. Non-2xx responses are errors.
pub async fn fetch_document(url: &str, options: &FetchOptions) -> Result<Value, FetchError> {
    let http_error = |source: reqwest::Error| FetchError::Http {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(options.timeout)
        .build()
        .map_err(http_error)?;
    log::debug!("fetching {url}");
    let response = client
        .get(url)
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(http_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content = response.text().await.map_err(http_error)?;
    value_from_str(&content).map_err(|source| FetchError::Content {
        location: url.to_string(),
        source,
    })
}

/// Read a JSON or YAML document from disk.
pub async fn read_document(path: &Path) -> Result<Value, FetchError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    value_from_str(&content).map_err(|source| FetchError::Content {
        location: path.display().to_string(),
        source,
    })
}

/// Fetch `location` when it is a URL, read it from disk otherwise.
pub async fn load_document(location: &str, options: &FetchOptions) -> Result<Value, FetchError> {
    if is_remote(location) {
        fetch_document(location, options).await
    } else {
        read_document(Path::new(location)).await
    }
}

/// [`DocumentLoader`] for bundling that follows URLs and file paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLoader {
    options: FetchOptions,
}

impl DefaultLoader {
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }
}

impl DocumentLoader for DefaultLoader {
    async fn load(&self, location: &str) -> Result<Value, BundleError> {
        load_document(location, &self.options)
            .await
            .map_err(|err| BundleError::Load {
                location: location.to_string(),
                message: err.to_string(),
            })
    }
}
