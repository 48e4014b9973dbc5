//! Plugin archive download.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::core::MirrorError;
use crate::ui;

/// Retrieves a remote artifact to a local file.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` to `dest`, replacing any existing file. Returns the
    /// number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, MirrorError>;
}

/// [`Fetcher`] over HTTP(S).
///
/// The package URL handed out by the update check is pre-authorized, so no
/// credentials are sent. The body is streamed to disk chunk by chunk.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    /// Fetcher with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher sharing an existing client.
    pub const fn with_client(http: reqwest::Client) -> Self {
        Self {
            http,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, MirrorError> {
        let failed = |reason: String| MirrorError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        ui::command(&format!("GET {url}"));
        let mut response =
            self.http.get(url).send().await.map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP {status}")));
        }

        let mut file = fs::File::create(dest).await?;
        let mut hasher = Sha256::new();
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(|e| failed(e.to_string()))? {
            file.write_all(&chunk).await?;
            hasher.update(&chunk);
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(
            target: "fetch",
            "Downloaded {written} bytes to {} (sha256 {})",
            dest.display(),
            hex::encode(hasher.finalize())
        );
        Ok(written)
    }
}
