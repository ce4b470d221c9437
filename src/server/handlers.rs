//! HTTP request handlers for the resize proxy.
//!
//! # Endpoints
//!
//! - `GET /resize?url=...&width=...&height=...` - Serve a resized JPEG
//! - `GET /` - Plain-text service banner
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{RawQuery, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::ResizeError;
use crate::resize::{ParamNames, ResizeRequest, ResizeService};
use crate::source::ImageSource;

use super::etag::{ClientCacheNegotiator, Negotiation};

/// Name of the service shown by the banner endpoint.
pub const SERVICE_NAME: &str = "Image Resize Proxy";

/// Response header reporting whether the server-side cache was used.
pub const CACHE_HIT_HEADER: &str = "x-cache-hit";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the resize service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: ImageSource> {
    /// The resize service, which owns the server-side cache
    pub resize_service: Arc<ResizeService<S>>,

    /// ETag negotiation for client-side caching
    pub negotiator: ClientCacheNegotiator,

    /// Query keys for the target dimensions
    pub param_names: Arc<ParamNames>,
}

impl<S: ImageSource> AppState<S> {
    /// Create a new application state with the given resize service.
    ///
    /// The client caching window matches the service's cache TTL.
    pub fn new(resize_service: ResizeService<S>) -> Self {
        let negotiator = ClientCacheNegotiator::new(resize_service.cache_ttl());
        Self {
            resize_service: Arc::new(resize_service),
            negotiator,
            param_names: Arc::new(ParamNames::default()),
        }
    }

    /// Use custom query keys for width and height.
    pub fn with_param_names(mut self, names: ParamNames) -> Self {
        self.param_names = Arc::new(names);
        self
    }
}

impl<S: ImageSource> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            resize_service: Arc::clone(&self.resize_service),
            negotiator: self.negotiator,
            param_names: Arc::clone(&self.param_names),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ResizeError to a plain-text HTTP response.
///
/// - Validation errors are logged at DEBUG (400)
/// - Upstream failures are logged at WARN (424)
/// - Everything else is logged at ERROR (500)
impl IntoResponse for ResizeError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ResizeError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                format!("400 request error: {}", err),
            ),

            ResizeError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method Not Allowed".to_string(),
            ),

            ResizeError::Fetch(_) | ResizeError::Decode { .. } => (
                StatusCode::FAILED_DEPENDENCY,
                format!("image loading error: {}", self),
            ),

            ResizeError::Encode { .. } | ResizeError::Worker { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("resize error: {}", self),
            ),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), "Server error: {}", message);
        } else if status == StatusCode::FAILED_DEPENDENCY {
            warn!(status = status.as_u16(), "Dependency failure: {}", message);
        } else {
            debug!(status = status.as_u16(), "Client error: {}", message);
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle resize requests.
///
/// # Endpoint
///
/// `GET /resize?url={url}&width={width}&height={height}`
///
/// # Query Parameters
///
/// - `url`: Source JPEG URL (percent-encoded)
/// - `width`: Target width, 0 or 32-8192 (key name configurable)
/// - `height`: Target height, 0 or 32-8192 (key name configurable)
///
/// # Response
///
/// - `200 OK`: JPEG image with `Content-Type: image/jpeg`
/// - `304 Not Modified`: `If-None-Match` carries a fresh ETag for this query
/// - `400 Bad Request`: Missing or out-of-range parameters
/// - `405 Method Not Allowed`: Any method other than GET
/// - `424 Failed Dependency`: Source could not be fetched or decoded
///
/// # Headers
///
/// - `ETag: {query_hash}X{unix_time}`
/// - `Cache-Control: public, max-age={caching_duration}`
/// - `X-Cache-Hit: true|false`
pub async fn resize_handler<S: ImageSource>(
    State(state): State<AppState<S>>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, ResizeError> {
    if method != Method::GET {
        return Err(ResizeError::MethodNotAllowed);
    }

    let raw_query = query.unwrap_or_default();
    let request = ResizeRequest::from_query_with(&raw_query, &state.param_names)?;

    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());

    let etag = match state.negotiator.negotiate_now(&raw_query, if_none_match) {
        Negotiation::NotModified => {
            debug!(url = %request.source_url, "Client copy still fresh");
            return Ok(StatusCode::NOT_MODIFIED.into_response());
        }
        Negotiation::Fresh(etag) => etag,
    };

    let response = state.resize_service.resize(&request).await?;

    let mut response_headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&etag.to_string()) {
        response_headers.insert(header::ETAG, value);
    }

    if !response.encoded {
        return Ok((StatusCode::OK, response_headers).into_response());
    }

    let max_age = state.negotiator.caching_duration().as_secs();
    response_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
    response_headers.insert(header::CACHE_CONTROL, cache_control_value(max_age));
    response_headers.insert(
        CACHE_HIT_HEADER,
        HeaderValue::from_static(if response.cache_hit { "true" } else { "false" }),
    );

    Ok((StatusCode::OK, response_headers, response.data).into_response())
}

/// Reject anything but GET before other layers see the request.
///
/// Sits outside the CORS layer on `/resize` so that preflight `OPTIONS`
/// requests get `405` instead of a CORS answer.
pub async fn require_get(request: Request, next: Next) -> Response {
    if request.method() != Method::GET {
        debug!(method = %request.method(), "Rejecting non-GET resize request");
        return ResizeError::MethodNotAllowed.into_response();
    }
    next.run(request).await
}

fn cache_control_value(max_age: u64) -> HeaderValue {
    HeaderValue::from_str(&format!("public, max-age={}", max_age))
        .unwrap_or_else(|_| HeaderValue::from_static("public"))
}

/// Handle requests for the root page.
///
/// Returns a one-line banner naming the service and its version, so the
/// service on a port can be identified and checked for liveness.
pub async fn root_handler() -> String {
    format!("{} ver. {}\n", SERVICE_NAME, env!("CARGO_PKG_VERSION"))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
