//! Resize Service for orchestrating the fetch-resize-encode pipeline.
//!
//! The ResizeService is the main entry point for resize requests. It
//! orchestrates:
//! - Server-side cache lookups
//! - Source fetching via an [`ImageSource`]
//! - JPEG decoding, resizing and re-encoding
//! - Result caching
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ResizeService                            │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                      resize()                           │    │
//! │  │  1. Check cache       3. Decode, resize, encode         │    │
//! │  │  2. Fetch source      4. Cache & return                 │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │           │                    │                    │           │
//! │           ▼                    ▼                    ▼           │
//! │    ┌─────────────┐     ┌──────────────┐     ┌──────────────┐    │
//! │    │ ResizeCache │     │ ImageSource  │     │  ImageCodec  │    │
//! │    └─────────────┘     └──────────────┘     └──────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Encode failures
//!
//! A failure to serialize the resized image is not reported to the caller.
//! The response carries no body, nothing is cached, and the failure is
//! counted in [`ServiceStats::encode_failures`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use crate::error::ResizeError;
use crate::source::ImageSource;

use super::cache::{CacheKey, ResizeCache, DEFAULT_CACHE_TTL};
use super::encoder::{resize_image, ImageCodec, JpegCodec};
use super::params::ResizeRequest;

// =============================================================================
// Resize Response
// =============================================================================

/// Response from the resize service.
#[derive(Debug, Clone)]
pub struct ResizeResponse {
    /// The encoded JPEG data (empty when encoding failed)
    pub data: Bytes,

    /// Whether this image was served from the server-side cache
    pub cache_hit: bool,

    /// Whether the image was encoded; `false` means the encode failure was
    /// suppressed and nothing was cached
    pub encoded: bool,
}

impl ResizeResponse {
    fn hit(data: Bytes) -> Self {
        Self {
            data,
            cache_hit: true,
            encoded: true,
        }
    }

    fn fresh(data: Bytes) -> Self {
        Self {
            data,
            cache_hit: false,
            encoded: true,
        }
    }

    fn suppressed() -> Self {
        Self {
            data: Bytes::new(),
            cache_hit: false,
            encoded: false,
        }
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Snapshot of service counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub fetches: u64,
    pub encode_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    fetches: AtomicU64,
    encode_failures: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> ServiceStats {
        ServiceStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            encode_failures: self.encode_failures.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// Resize Service
// =============================================================================

/// Service for producing and caching resized images.
///
/// # Type Parameters
///
/// * `S` - The image source (e.g., [`crate::source::HttpImageSource`])
///
/// # Example
///
/// ```ignore
/// use resize_proxy::resize::{ResizeRequest, ResizeService};
/// use resize_proxy::source::HttpImageSource;
///
/// let service = ResizeService::new(HttpImageSource::new()?);
///
/// let request = ResizeRequest::new("http://host/sample.jpg", 100, 0);
/// let response = service.resize(&request).await?;
///
/// println!("{} bytes, cache hit: {}", response.data.len(), response.cache_hit);
/// ```
pub struct ResizeService<S: ImageSource> {
    /// Where source images come from
    source: Arc<S>,

    /// Cache for encoded images
    cache: ResizeCache,

    /// How long cached images stay fresh
    cache_ttl: Duration,

    /// Decoder/encoder, shared with blocking workers
    codec: Arc<dyn ImageCodec>,

    counters: Counters,
}

impl<S: ImageSource> ResizeService<S> {
    /// Create a new service with default cache settings.
    ///
    /// Uses the default cache capacity (100MB) and TTL (1 hour).
    pub fn new(source: S) -> Self {
        Self::with_cache(source, ResizeCache::new())
    }

    /// Create a new service with custom cache capacity in bytes.
    pub fn with_cache_capacity(source: S, cache_capacity: usize) -> Self {
        Self::with_cache(source, ResizeCache::with_capacity(cache_capacity))
    }

    /// Create a new service around an existing cache.
    pub fn with_cache(source: S, cache: ResizeCache) -> Self {
        Self {
            source: Arc::new(source),
            cache,
            cache_ttl: DEFAULT_CACHE_TTL,
            codec: Arc::new(JpegCodec::new()),
            counters: Counters::default(),
        }
    }

    /// Set how long cached images stay fresh.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Replace the codec.
    pub fn with_codec(mut self, codec: impl ImageCodec) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Get a resized image, using the cache when possible.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be fetched or is not a JPEG.
    /// Encode failures are not errors; see [`ResizeResponse::encoded`].
    pub async fn resize(&self, request: &ResizeRequest) -> Result<ResizeResponse, ResizeError> {
        let key = CacheKey::new(&request.source_url, request.width, request.height);

        if let Some(data) = self.cache.get(&key).await {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, bytes = data.len(), "Server cache hit");
            return Ok(ResizeResponse::hit(data));
        }

        self.counters.cache_misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Server cache miss");

        match self.generate(request).await {
            Ok(data) => {
                self.cache.set(key, data.clone(), self.cache_ttl).await;
                Ok(ResizeResponse::fresh(data))
            }
            Err(ResizeError::Encode { message }) => {
                self.counters.encode_failures.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Encode failed, skipping cache: {}", message);
                Ok(ResizeResponse::suppressed())
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch, decode, resize and encode without touching the cache.
    ///
    /// Decoding, resizing and encoding run on the blocking thread pool.
    pub async fn generate(&self, request: &ResizeRequest) -> Result<Bytes, ResizeError> {
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        let source = self.source.fetch(&request.source_url).await?;

        let codec = Arc::clone(&self.codec);
        let (width, height) = (request.width, request.height);

        tokio::task::spawn_blocking(move || {
            let image = codec.decode(&source)?;
            let resized = resize_image(&image, width, height);
            codec.encode(&resized)
        })
        .await
        .map_err(|e| ResizeError::Worker {
            message: e.to_string(),
        })?
    }

    /// Get the image source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get the server-side cache.
    pub fn cache(&self) -> &ResizeCache {
        &self.cache
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Get a snapshot of the service counters.
    pub fn stats(&self) -> ServiceStats {
        self.counters.snapshot()
    }

    /// Get cache statistics as `(current_size, capacity, entry_count)`.
    pub async fn cache_stats(&self) -> (usize, usize, usize) {
        let size = self.cache.size().await;
        let capacity = self.cache.capacity();
        let count = self.cache.len().await;
        (size, capacity, count)
    }

    /// Clear the server-side cache.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

// =============================================================================
// Tests
// =============================================================================
