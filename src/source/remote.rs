//! HTTP implementation of [`ImageSource`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use tracing::debug;

use super::ImageSource;
use crate::error::FetchError;

/// Default upper bound on a single source fetch, body included.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum source body size: 32MB
pub const DEFAULT_MAX_SOURCE_SIZE: u64 = 32 * 1024 * 1024;

/// Maximum number of redirects followed per fetch.
const MAX_REDIRECTS: usize = 5;

/// Fetches source images over HTTP(S).
///
/// Every fetch is bounded by a timeout covering connect, headers and body, so
/// a stalled upstream cannot hold a request open indefinitely.
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: Client,
    max_size: u64,
}

impl HttpImageSource {
    /// Create a source with the default timeout and size limit.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_limits(DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_SOURCE_SIZE)
    }

    /// Create a source with a custom timeout and maximum body size in bytes.
    pub fn with_limits(timeout: Duration, max_size: u64) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("resize-proxy/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self::with_client(client, max_size))
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client, max_size: u64) -> Self {
        Self { client, max_size }
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    fn map_error(url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::map_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let too_large = || FetchError::TooLarge {
            url: url.to_string(),
            limit: self.max_size,
        };

        if response.content_length().is_some_and(|len| len > self.max_size) {
            return Err(too_large());
        }

        // Content-Length may be absent or wrong, so enforce the limit while reading
        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Self::map_error(url, e))?
        {
            if (body.len() + chunk.len()) as u64 > self.max_size {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url = url, bytes = body.len(), "Fetched source image");

        Ok(body.freeze())
    }
}

// =============================================================================
// Tests
// =============================================================================
