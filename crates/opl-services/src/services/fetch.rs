//! Image fetcher
//!
//! Turns a file-sharing link into a direct-download URL and saves the image
//! into the request workspace. Failures are logged and reported as `None`;
//! a missing image never fails a submission.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Context;
use opl_core::config::DEFAULT_DIRECT_LINK_TEMPLATE;
use opl_core::FetchConfig;
use regex::Regex;
use reqwest::StatusCode;
use thiserror::Error;

use crate::retry::RetryPolicy;

static FILE_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/d/([A-Za-z0-9_-]+)").expect("file id pattern is a valid regex")
});

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No file id found in share link")]
    Unresolvable,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(StatusCode),

    #[error("Image exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Response is not a supported image: {0}")]
    NotAnImage(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Timeouts, connection failures and server errors may succeed on a second try.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status(status) => status.is_server_error(),
            _ => false,
        }
    }
}

/// Direct-download URL for a sharing link of the form `.../d/<id>/...`, using
/// the default Google Drive template.
pub fn resolve_direct_link(share_url: &str) -> Option<String> {
    resolve_with_template(share_url, DEFAULT_DIRECT_LINK_TEMPLATE)
}

fn resolve_with_template(share_url: &str, template: &str) -> Option<String> {
    let id = FILE_ID_PATTERN.captures(share_url)?.get(1)?.as_str();
    Some(template.replace("{id}", id))
}

#[derive(Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    direct_link_template: String,
    max_image_bytes: usize,
    retry: RetryPolicy,
}

impl ImageFetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client for image downloads")?;

        Ok(Self {
            client,
            direct_link_template: config.direct_link_template.clone(),
            max_image_bytes: config.max_image_bytes,
            retry: RetryPolicy::new(config.max_attempts, RETRY_BACKOFF),
        })
    }

    pub fn direct_link(&self, share_url: &str) -> Option<String> {
        resolve_with_template(share_url, &self.direct_link_template)
    }

    /// Download the image behind `share_url` to `dest`.
    ///
    /// Returns `Some(dest)` only when a 200 response carrying a decodable
    /// image was written; every other outcome is logged and yields `None`.
    pub async fn download_image(&self, share_url: Option<&str>, dest: &Path) -> Option<PathBuf> {
        let Some(share_url) = share_url.map(str::trim).filter(|u| !u.is_empty()) else {
            tracing::debug!(dest = %dest.display(), "No image link provided, skipping download");
            return None;
        };

        match self.fetch_to(share_url, dest).await {
            Ok(size) => {
                tracing::info!(
                    url = %share_url,
                    dest = %dest.display(),
                    size_bytes = size,
                    "Image downloaded"
                );
                Some(dest.to_path_buf())
            }
            Err(e) => {
                tracing::warn!(
                    url = %share_url,
                    error = %e,
                    "Image download failed, continuing without it"
                );
                None
            }
        }
    }

    async fn fetch_to(&self, share_url: &str, dest: &Path) -> Result<usize, FetchError> {
        let url = self.direct_link(share_url).ok_or(FetchError::Unresolvable)?;

        let body = self
            .retry
            .run("image download", |_| self.fetch_bytes(&url), FetchError::is_retryable)
            .await?;

        let body = tokio::task::spawn_blocking(move || ensure_image(&body).map(|()| body))
            .await
            .map_err(|e| FetchError::NotAnImage(e.to_string()))??;

        tokio::fs::write(dest, &body)
            .await
            .map_err(|e| FetchError::Write {
                path: dest.to_path_buf(),
                source: e,
            })?;

        Ok(body.len())
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status));
        }

        let limit = self.max_image_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(FetchError::TooLarge { limit });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

/// Sharing services answer some requests with an HTML page instead of the
/// file, and a dropped connection can leave a truncated body behind. Only keep
/// bodies that decode completely.
fn ensure_image(body: &[u8]) -> Result<(), FetchError> {
    image::load_from_memory(body).map_err(|e| FetchError::NotAnImage(e.to_string()))?;
    Ok(())
}
