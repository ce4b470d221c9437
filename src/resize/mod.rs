//! Resize service layer.
//!
//! This module turns a validated request into resized JPEG bytes, caching the
//! results so repeated requests skip both the fetch and the resize.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │ ResizeRequest
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             Resize Service              │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │ ResizeCache  │  │   JpegCodec     │  │
//! │  │  (encoded    │  │  (decode →      │  │
//! │  │   JPEGs)     │  │ resize → encode)│  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               ImageSource               │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`ResizeRequest`]: Validated source URL and target dimensions
//! - [`CacheKey`]: `url:width:height` fingerprint
//! - [`ResizeCache`]: LRU cache with size-based eviction and per-entry expiry
//! - [`JpegCodec`]: Decodes the source and encodes the result at quality 92
//! - [`ResizeService`]: Orchestrates cache, fetch, resize and encode

mod cache;
mod encoder;
mod params;
mod service;

pub use cache::{CacheKey, ResizeCache, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
pub use encoder::{
    resize_image, target_dimensions, ImageCodec, JpegCodec, JPEG_QUALITY, RESIZE_FILTER,
};
pub use params::{
    ParamNames, ResizeRequest, DEFAULT_HEIGHT_PARAM, DEFAULT_WIDTH_PARAM, MAX_SIZE, MIN_SIZE,
    URL_PARAM,
};
pub use service::{ResizeResponse, ResizeService, ServiceStats};
