//! # Resize Proxy
//!
//! An HTTP proxy that fetches a remote JPEG image, resizes it to the
//! requested dimensions and returns the result.
//!
//! Two caches keep repeated work down:
//!
//! - **Client side**: every response carries an ETag built from the query
//!   string and the response time. Replaying it in `If-None-Match` within the
//!   caching window yields `304 Not Modified`.
//! - **Server side**: resized images are kept in a size-bounded LRU cache with
//!   per-entry expiry, keyed by `url:width:height`.
//!
//! ## Architecture
//!
//! - [`resize`] - Parameter validation, server-side cache, resize pipeline
//! - [`source`] - Fetching source images over HTTP
//! - [`server`] - Axum handlers, ETag negotiation, router
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use resize_proxy::{create_router, HttpImageSource, ResizeService, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ResizeService::new(HttpImageSource::new()?);
//!     let router = create_router(service, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("localhost:8080").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod resize;
pub mod server;
pub mod source;

// Re-export commonly used types
pub use config::Config;
pub use error::{FetchError, ResizeError, ValidationError};
pub use resize::{
    CacheKey, ImageCodec, JpegCodec, ParamNames, ResizeCache, ResizeRequest, ResizeResponse,
    ResizeService, ServiceStats, JPEG_QUALITY, MAX_SIZE, MIN_SIZE,
};
pub use server::{
    create_router, ClientCacheNegotiator, ETag, Negotiation, RouterConfig, CACHE_HIT_HEADER,
};
pub use source::{HttpImageSource, ImageSource};
