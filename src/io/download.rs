//! Content-addressed blob downloads
//!
//! Bottles live in a container registry and are fetched by digest with an
//! anonymous bearer token. Because the blob is addressed by its SHA256, the
//! received bytes are hashed while streaming and verified against the
//! requested digest before the download is accepted.

use std::io::Write;
use std::path::Path;

use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::types::Sha256Hash;

/// Container registry serving bottle blobs.
pub const DEFAULT_BLOB_URL: &str = "https://ghcr.io";

/// Anonymous pull token accepted by the public registry.
const ANONYMOUS_TOKEN: &str = "Bearer QQ==";

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}

/// Client for authenticated bottle downloads.
#[derive(Debug, Clone)]
pub struct BlobClient {
    client: Client,
    base_url: String,
}

impl BlobClient {
    /// Create a client against a blob registry base URL.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Stream the blob for `name`/`sha256` into `dest`, verifying the digest.
    ///
    /// A digest mismatch removes the partial file and fails the download.
    pub async fn fetch(
        &self,
        name: &str,
        sha256: &Sha256Hash,
        dest: &Path,
    ) -> Result<(), DownloadError> {
        let url = format!(
            "{}/v2/homebrew/core/{name}/blobs/sha256:{sha256}",
            self.base_url
        );
        tracing::debug!("Downloading blob: {url}");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, ANONYMOUS_TOKEN)
            .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
            .send()
            .await?
            .error_for_status()?;

        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut hasher = Sha256::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            hasher.write_all(&chunk)?;
        }

        file.flush().await?;
        let actual = hex::encode(hasher.finalize());

        if actual != sha256.as_str() {
            tokio::fs::remove_file(dest).await.ok();
            return Err(DownloadError::HashMismatch {
                expected: sha256.to_string(),
                actual,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use tempfile::tempdir;

    fn sha256_hex(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    #[tokio::test]
    async fn test_fetch_writes_blob() {
        let body = b"fake bottle tar bytes";
        let digest = sha256_hex(body);

        let mut server = Server::new_async().await;
        let path = format!("/v2/homebrew/core/cairo/blobs/sha256:{digest}");
        let mock = server
            .mock("GET", path.as_str())
            .match_header("authorization", "Bearer QQ==")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join(format!("{digest}.tar"));

        let blobs = BlobClient::new(Client::new(), server.url());
        blobs
            .fetch("cairo", &Sha256Hash::new(digest.clone()), &dest)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn test_fetch_rejects_digest_mismatch() {
        let wrong = "0".repeat(64);

        let mut server = Server::new_async().await;
        let path = format!("/v2/homebrew/core/cairo/blobs/sha256:{wrong}");
        let _m = server
            .mock("GET", path.as_str())
            .with_status(200)
            .with_body(b"unexpected contents")
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("blob.tar");

        let blobs = BlobClient::new(Client::new(), server.url());
        let err = blobs
            .fetch("cairo", &Sha256Hash::new(wrong), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::HashMismatch { .. }));
        // Partial file removed
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_fetch_propagates_http_status() {
        let digest = "f".repeat(64);

        let mut server = Server::new_async().await;
        let path = format!("/v2/homebrew/core/cairo/blobs/sha256:{digest}");
        let _m = server
            .mock("GET", path.as_str())
            .with_status(403)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let blobs = BlobClient::new(Client::new(), server.url());
        let err = blobs
            .fetch("cairo", &Sha256Hash::new(digest), &dir.path().join("b.tar"))
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Http(_)));
    }
}
