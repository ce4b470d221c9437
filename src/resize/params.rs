//! Query parameter validation for resize requests.
//!
//! A resize request carries three query parameters: the source image URL and
//! the target width and height. A zero dimension means "derive it from the
//! source aspect ratio", so at most one of them may be zero.
//!
//! # Bounds
//!
//! Non-zero dimensions must lie in `[MIN_SIZE, MAX_SIZE]`. The lower bound on
//! height is only enforced when width is non-zero, so `width=0&height=8` is
//! accepted while `width=64&height=8` is not.

use std::borrow::Cow;

use crate::error::ValidationError;

/// Smallest accepted non-zero dimension in pixels.
pub const MIN_SIZE: u32 = 32;

/// Largest accepted dimension in pixels.
pub const MAX_SIZE: u32 = 8192;

/// Name of the query parameter carrying the source URL.
pub const URL_PARAM: &str = "url";

/// Default name of the width query parameter.
pub const DEFAULT_WIDTH_PARAM: &str = "width";

/// Default name of the height query parameter.
pub const DEFAULT_HEIGHT_PARAM: &str = "height";

// =============================================================================
// Parameter Names
// =============================================================================

/// Query keys used to read the target dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamNames {
    pub width: String,
    pub height: String,
}

impl ParamNames {
    pub fn new(width: impl Into<String>, height: impl Into<String>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }
}

impl Default for ParamNames {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH_PARAM, DEFAULT_HEIGHT_PARAM)
    }
}

// =============================================================================
// Resize Request
// =============================================================================

/// A validated resize request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeRequest {
    /// URL of the source JPEG
    pub source_url: String,

    /// Target width in pixels (0 = derive from aspect ratio)
    pub width: u32,

    /// Target height in pixels (0 = derive from aspect ratio)
    pub height: u32,
}

impl ResizeRequest {
    /// Create a request without validating it.
    pub fn new(source_url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            source_url: source_url.into(),
            width,
            height,
        }
    }

    /// Parse and validate a raw query string using the default parameter names.
    pub fn from_query(raw_query: &str) -> Result<Self, ValidationError> {
        Self::from_query_with(raw_query, &ParamNames::default())
    }

    /// Parse and validate a raw query string.
    ///
    /// Presence of all three parameters is checked before any value is
    /// parsed, so a request missing `height` reports that even when `width`
    /// is malformed.
    pub fn from_query_with(raw_query: &str, names: &ParamNames) -> Result<Self, ValidationError> {
        let source_url = first_non_empty(raw_query, URL_PARAM)
            .ok_or_else(|| ValidationError::Missing(URL_PARAM.to_string()))?;
        let raw_width = first_non_empty(raw_query, &names.width)
            .ok_or_else(|| ValidationError::Missing(names.width.clone()))?;
        let raw_height = first_non_empty(raw_query, &names.height)
            .ok_or_else(|| ValidationError::Missing(names.height.clone()))?;

        let width = parse_dimension(&names.width, &raw_width)?;
        if (width > 0 && width < u64::from(MIN_SIZE)) || width > u64::from(MAX_SIZE) {
            return Err(ValidationError::WidthOutOfLimit);
        }
        let width = u32::try_from(width).map_err(|_| ValidationError::WidthOutOfLimit)?;

        let height = parse_dimension(&names.height, &raw_height)?;
        if (width > 0 && height > 0 && height < u64::from(MIN_SIZE))
            || height > u64::from(MAX_SIZE)
        {
            return Err(ValidationError::HeightOutOfLimit);
        }
        let height = u32::try_from(height).map_err(|_| ValidationError::HeightOutOfLimit)?;

        if width == 0 && height == 0 {
            return Err(ValidationError::NoDimensions);
        }

        Ok(Self {
            source_url: source_url.into_owned(),
            width,
            height,
        })
    }
}

/// First value for `key`, treating an empty value as absent.
fn first_non_empty<'a>(raw_query: &'a str, key: &str) -> Option<Cow<'a, str>> {
    url::form_urlencoded::parse(raw_query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

/// Dimensions are read as `u64` so oversized values report a range error.
fn parse_dimension(field: &str, value: &str) -> Result<u64, ValidationError> {
    value
        .parse::<u64>()
        .map_err(|_| ValidationError::NotAnInteger {
            field: field.to_string(),
            value: value.to_string(),
        })
}

// =============================================================================
// Tests
// =============================================================================
