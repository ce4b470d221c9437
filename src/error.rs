use thiserror::Error;

/// Errors produced while validating the query of a resize request.
///
/// Each variant names the offending field so the message can be returned to
/// the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A mandatory parameter is absent or empty
    #[error("non empty `{0}` parameter is mandatory")]
    Missing(String),

    /// A dimension is not an unsigned integer
    #[error("`{field}` must be an unsigned integer, got {value:?}")]
    NotAnInteger { field: String, value: String },

    /// Width is non-zero and outside the allowed range
    #[error("width value is out of limit")]
    WidthOutOfLimit,

    /// Height is outside the allowed range
    #[error("height value is out of limit")]
    HeightOutOfLimit,

    /// Both dimensions are zero
    #[error("either width or height should be greater than zero")]
    NoDimensions,
}

/// Errors that can occur when fetching a source image.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Connection, DNS or protocol failure
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The upstream did not answer in time
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The upstream answered with a non-success status
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The upstream body exceeds the configured limit
    #[error("source image at {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: u64 },
}

/// Errors from the resize pipeline.
#[derive(Debug, Clone, Error)]
pub enum ResizeError {
    /// The request query failed validation (HTTP 400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request used a method other than GET (HTTP 405)
    #[error("method not allowed")]
    MethodNotAllowed,

    /// The source image could not be fetched (HTTP 424)
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The source body is not a decodable JPEG (HTTP 424)
    #[error("failed to decode source image: {message}")]
    Decode { message: String },

    /// The resized image could not be serialized
    #[error("failed to encode resized image: {message}")]
    Encode { message: String },

    /// A blocking worker panicked or was cancelled
    #[error("worker failed: {message}")]
    Worker { message: String },
}

impl ResizeError {
    /// Whether the error was caused by the upstream image server.
    pub fn is_dependency_failure(&self) -> bool {
        matches!(self, ResizeError::Fetch(_) | ResizeError::Decode { .. })
    }
}
