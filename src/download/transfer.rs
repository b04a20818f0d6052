//! Media transfer to the destination directory

use crate::crawler::classify_error;
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Capability to copy a remote media file to a local path
#[async_trait]
pub trait MediaTransfer: Send + Sync {
    /// Downloads `url` into `destination` and returns the HTTP status
    ///
    /// A response outside 2xx fails with `HarvestError::TransferStatus` and
    /// leaves `destination` untouched.
    async fn transfer(&self, url: &str, destination: &Path) -> Result<u16, HarvestError>;
}

/// Streams media over HTTP into a `.part` file, renamed once complete
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    client: Client,
}

impl HttpTransfer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Path of the in-progress file for `destination`
fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

async fn write_body(url: &str, response: &mut Response, path: &Path) -> Result<u64, HarvestError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;

    while let Some(chunk) = response.chunk().await.map_err(|e| classify_error(url, e))? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

#[async_trait]
impl MediaTransfer for HttpTransfer {
    async fn transfer(&self, url: &str, destination: &Path) -> Result<u16, HarvestError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::TransferStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let part = part_path(destination);
        match write_body(url, &mut response, &part).await {
            Ok(bytes) => tracing::debug!("Received {} bytes from {}", bytes, url),
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                return Err(e);
            }
        }

        if let Err(e) = tokio::fs::rename(&part, destination).await {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e.into());
        }

        Ok(status.as_u16())
    }
}
