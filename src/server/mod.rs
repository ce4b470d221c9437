//! HTTP server layer for the resize proxy.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           HTTP Layer                            │
//! │        GET /resize?url={url}&width={width}&height={height}      │
//! │                                                                 │
//! │  ┌─────────────┐  ┌──────────────────┐  ┌────────────────────┐  │
//! │  │  handlers   │  │       etag       │  │       routes       │  │
//! │  │ (requests)  │  │ (If-None-Match)  │  │  (router config)   │  │
//! │  └─────────────┘  └──────────────────┘  └────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod etag;
pub mod handlers;
pub mod routes;

pub use etag::{fnv1_64, unix_now, ClientCacheNegotiator, ETag, Negotiation, ETAG_SEPARATOR};
pub use handlers::{
    health_handler, require_get, resize_handler, root_handler, AppState, HealthResponse, CACHE_HIT_HEADER,
    SERVICE_NAME,
};
pub use routes::{create_router, RouterConfig};
