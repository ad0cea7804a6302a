//! Download module.
//!
//! Fetches a whole release archive into memory while hashing it. There is no
//! retry and no timeout: a failed or hung request fails or hangs the run.

use bytes::{Bytes, BytesMut};
use reqwest::Client;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};
use x13_schema::Sha256Hash;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A fully downloaded archive and its SHA256 digest.
#[derive(Debug, Clone)]
pub struct Downloaded {
    pub url: String,
    pub bytes: Bytes,
    pub sha256: Sha256Hash,
}

/// Build the HTTP client used for archive downloads.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_client() -> Result<Client, DownloadError> {
    Ok(Client::builder().user_agent(crate::USER_AGENT).build()?)
}

/// Download `url` into memory, computing its SHA256 on the way.
///
/// Non-success status codes are errors.
pub async fn fetch(client: &Client, url: &str) -> Result<Downloaded, DownloadError> {
    debug!(url, "requesting archive");
    let mut resp = client.get(url).send().await?.error_for_status()?;

    // Content-Length is advisory; the buffer grows with the body
    let mut buf = BytesMut::new();
    let mut hasher = Sha256::new();
    while let Some(chunk) = resp.chunk().await? {
        hasher.update(&chunk);
        buf.extend_from_slice(&chunk);
    }

    let sha256 = Sha256Hash::new(hex::encode(hasher.finalize()));
    info!(url, size = buf.len(), %sha256, "downloaded archive");

    Ok(Downloaded {
        url: url.to_string(),
        bytes: buf.freeze(),
        sha256,
    })
}
