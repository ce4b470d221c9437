//! Source image retrieval.
//!
//! The resize service does not talk HTTP directly; it asks an [`ImageSource`]
//! for the raw bytes behind a URL. [`HttpImageSource`] is the production
//! implementation, and tests substitute in-memory sources.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Resize Service             │
//! └────────────────────┬────────────────────┘
//!                      │ fetch(url)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           ImageSource Trait             │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   HttpImageSource (reqwest, timeout,    │
//! │   body size limit)                      │
//! └─────────────────────────────────────────┘
//! ```

mod remote;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;

pub use remote::{HttpImageSource, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_SOURCE_SIZE};

/// Something that can fetch the raw body of a source image.
#[async_trait]
pub trait ImageSource: Send + Sync + 'static {
    /// Fetch the full body behind `url`.
    ///
    /// Implementations never retry; a failure is reported immediately.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}
