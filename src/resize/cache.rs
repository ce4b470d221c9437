//! Server-side cache for resized JPEG images.
//!
//! This module provides an LRU cache for encoded images, so a repeated request
//! for the same source and dimensions skips both the fetch and the resize.
//!
//! # Cache Key
//!
//! Entries are keyed by the fingerprint `url:width:height`. Two requests with
//! the same triple always share an entry.
//!
//! # Expiration and Eviction
//!
//! Every entry carries an absolute expiry. Expired entries read as misses but
//! stay resident until LRU eviction reclaims them or a `set` overwrites them.
//! The cache tracks the total size of stored images in bytes and evicts
//! least-recently-used entries once that exceeds capacity.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use lru::LruCache;
use tokio::sync::RwLock;

/// Default cache capacity: 100MB
pub const DEFAULT_CACHE_CAPACITY: usize = 100 * 1024 * 1024;

/// Default time an entry stays fresh: 1 hour
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Default maximum number of entries (to bound LRU overhead)
const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Separator between the fields of a cache key.
const KEY_SEPARATOR: char = ':';

// =============================================================================
// Cache Key
// =============================================================================

/// Fingerprint of a resize request: `url:width:height`.
///
/// A URL that itself ends in `:<digits>:<digits>` can alias another triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Arc<str>);

impl CacheKey {
    /// Format the key for a source URL and target dimensions.
    pub fn new(url: &str, width: u32, height: u32) -> Self {
        Self(Arc::from(format!(
            "{url}{sep}{width}{sep}{height}",
            sep = KEY_SEPARATOR
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Cache Entry
// =============================================================================

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Bytes,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

// =============================================================================
// Resize Cache
// =============================================================================

/// LRU cache for encoded JPEG images with size-based capacity and per-entry
/// expiry.
///
/// # Thread Safety
///
/// The cache is thread-safe and can be shared across async tasks via `Arc`.
///
/// # Example
///
/// ```
/// use resize_proxy::resize::{CacheKey, ResizeCache};
/// use bytes::Bytes;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let cache = ResizeCache::new();
///
///     let key = CacheKey::new("http://host/sample.jpg", 100, 0);
///     let data = Bytes::from(vec![0xFF, 0xD8, 0xFF, 0xE0]);
///
///     cache.set(key.clone(), data.clone(), Duration::from_secs(60)).await;
///     assert_eq!(cache.get(&key).await, Some(data));
/// }
/// ```
pub struct ResizeCache {
    /// The underlying LRU cache
    cache: RwLock<LruCache<CacheKey, CacheEntry>>,

    /// Maximum total size in bytes
    max_size: usize,

    /// Current total size in bytes
    current_size: RwLock<usize>,
}

impl ResizeCache {
    /// Create a new cache with default capacity (100MB).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a new cache with the specified capacity in bytes.
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    /// Create a new cache with specified capacity and maximum entries.
    ///
    /// A `max_entries` of zero is treated as one.
    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        let max_entries = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(max_entries)),
            max_size,
            current_size: RwLock::new(0),
        }
    }

    /// Get an image from the cache.
    ///
    /// Returns `None` when the key is absent or its entry has expired. A hit
    /// marks the entry as recently used; an expired entry is left untouched.
    pub async fn get(&self, key: &CacheKey) -> Option<Bytes> {
        let now = Instant::now();
        let mut cache = self.cache.write().await;

        if !cache.peek(key)?.is_fresh(now) {
            return None;
        }
        cache.get(key).map(|entry| entry.data.clone())
    }

    /// Check if an unexpired image is cached without updating LRU order.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        let now = Instant::now();
        let cache = self.cache.read().await;
        cache.peek(key).is_some_and(|entry| entry.is_fresh(now))
    }

    /// Store an image that stays fresh for `ttl`.
    ///
    /// An existing entry is replaced wholesale. If the cache is over capacity
    /// after insertion, least-recently-used entries are evicted until it fits.
    pub async fn set(&self, key: CacheKey, data: Bytes, ttl: Duration) {
        let data_size = data.len();
        let entry = CacheEntry {
            data,
            expires_at: Instant::now() + ttl,
        };

        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;

        if let Some(old) = cache.peek(&key) {
            *current_size = current_size.saturating_sub(old.data.len());
        }

        // `push` reports entries displaced by the entry-count bound
        if let Some((evicted_key, evicted)) = cache.push(key.clone(), entry) {
            if evicted_key != key {
                *current_size = current_size.saturating_sub(evicted.data.len());
            }
        }
        *current_size += data_size;

        while *current_size > self.max_size {
            if let Some((_, evicted)) = cache.pop_lru() {
                *current_size = current_size.saturating_sub(evicted.data.len());
            } else {
                break;
            }
        }
    }

    /// Remove an image from the cache.
    pub async fn remove(&self, key: &CacheKey) -> Option<Bytes> {
        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;

        let entry = cache.pop(key)?;
        *current_size = current_size.saturating_sub(entry.data.len());
        Some(entry.data)
    }

    /// Clear all entries from the cache.
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;
        cache.clear();
        *current_size = 0;
    }

    /// Number of resident entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Current total size of resident images in bytes.
    pub async fn size(&self) -> usize {
        *self.current_size.read().await
    }

    /// Maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for ResizeCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
