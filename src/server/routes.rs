//! Router configuration for the resize proxy.
//!
//! This module defines the HTTP routes and applies middleware for CORS and
//! request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /          - Service banner (public)
//! /health    - Health check (public)
//! /resize    - Resize endpoint; any method other than GET gets 405,
//!              CORS preflight included
//! ```
//!
//! # Example
//!
//! ```ignore
//! use resize_proxy::server::routes::{create_router, RouterConfig};
//! use resize_proxy::resize::ResizeService;
//! use resize_proxy::source::HttpImageSource;
//!
//! let service = ResizeService::new(HttpImageSource::new()?);
//! let router = create_router(service, RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("localhost:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use http::header::{CONTENT_TYPE, IF_NONE_MATCH};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, require_get, resize_handler, root_handler, AppState};
use crate::resize::{ParamNames, ResizeService};
use crate::source::ImageSource;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,

    /// Query keys for the target dimensions
    pub param_names: ParamNames,
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Tracing is enabled
    /// - Dimensions are read from `width` and `height`
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
            param_names: ParamNames::default(),
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Read dimensions from custom query keys.
    pub fn with_param_names(mut self, names: ParamNames) -> Self {
        self.param_names = names;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// The resize service is moved into shared state here; it is the single owner
/// of the server-side cache for the lifetime of the router.
pub fn create_router<S>(resize_service: ResizeService<S>, config: RouterConfig) -> Router
where
    S: ImageSource,
{
    let app_state = AppState::new(resize_service).with_param_names(config.param_names.clone());
    let cors = build_cors_layer(&config);

    // Method check wraps CORS so preflights on /resize are rejected too
    let resize_routes: Router<AppState<S>> = Router::new()
        .route("/resize", any(resize_handler::<S>))
        .layer(cors.clone())
        .layer(middleware::from_fn(require_get));

    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .merge(resize_routes)
        .with_state(app_state);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, IF_NONE_MATCH])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
