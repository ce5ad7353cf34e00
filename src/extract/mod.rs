//! Address extraction
//!
//! Downloads the published CSV export of the address spreadsheet and stores
//! it verbatim on local disk. The destination is replaced atomically: the
//! body is written to a sibling `.part` file which is renamed over the
//! destination only once it is complete, so a failed run never leaves a
//! half-written or truncated raw file behind.

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fetches the spreadsheet export
#[derive(Debug)]
pub struct AddressExtractor {
    client: HttpClient,
}

impl AddressExtractor {
    /// Create an extractor around an existing client
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Create an extractor from the shared HTTP settings
    pub fn from_config(http: &HttpConfig) -> Result<Self> {
        let config = HttpClientConfig::builder()
            .timeout(http.timeout())
            .user_agent(&http.user_agent)
            .build();
        Ok(Self::new(HttpClient::with_config(config)?))
    }

    /// Download `source_url` into `destination`, returning the bytes written.
    ///
    /// Performs exactly one GET. Transport failures, non-2xx statuses and
    /// write failures are all reported as [`Error::ExtractionFailed`]; in
    /// every failure case the destination is left as it was.
    pub async fn extract(&self, source_url: &str, destination: impl AsRef<Path>) -> Result<u64> {
        let destination = destination.as_ref();
        info!(
            operation = "extract",
            url = source_url,
            destination = %destination.display(),
            "Extracting addresses from spreadsheet export"
        );

        let body = self
            .client
            .get_text(source_url, RequestConfig::new())
            .await
            .map_err(|e| Error::extraction(source_url, e.to_string()))?;

        write_atomic(destination, body.as_bytes())
            .await
            .map_err(|e| {
                Error::extraction(
                    source_url,
                    format!("failed to write '{}': {e}", destination.display()),
                )
            })?;

        let bytes = body.len() as u64;
        info!(bytes, "Data extracted to {}", destination.display());
        Ok(bytes)
    }
}

/// Sibling path the body is staged in before the rename
pub(crate) fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Write to a staging file then rename over the destination
async fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let staging = staging_path(path);
    debug!("Staging download in {}", staging.display());

    if let Err(e) = tokio::fs::write(&staging, contents).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e);
    }

    if let Err(e) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e);
    }

    Ok(())
}

#[cfg(test)]
mod tests;
