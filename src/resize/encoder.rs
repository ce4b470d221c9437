//! JPEG decoding, resizing and encoding.
//!
//! # Design Decisions
//!
//! - **Codec seam**: decoding and encoding go through [`ImageCodec`] so the
//!   service can be exercised with codecs that fail on purpose.
//!
//! - **Bilinear only**: images are resized with the `image` crate's triangle
//!   filter, which is bilinear interpolation.
//!
//! - **Aspect-ratio auto-fill**: a zero target dimension is derived from the
//!   source aspect ratio and the other, non-zero dimension.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

use crate::error::ResizeError;

use super::params::MAX_SIZE;

/// JPEG quality used for every resized image.
pub const JPEG_QUALITY: u8 = 92;

/// Interpolation used when resizing.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

// =============================================================================
// Codec
// =============================================================================

/// Decodes source images and encodes resized ones.
pub trait ImageCodec: Send + Sync + 'static {
    /// Decode a source body into pixels.
    fn decode(&self, source: &[u8]) -> Result<DynamicImage, ResizeError>;

    /// Serialize resized pixels.
    fn encode(&self, image: &DynamicImage) -> Result<Bytes, ResizeError>;
}

/// JPEG codec with a fixed output quality.
#[derive(Debug, Clone)]
pub struct JpegCodec {
    quality: u8,
}

impl JpegCodec {
    /// Create a codec that encodes at [`JPEG_QUALITY`].
    pub fn new() -> Self {
        Self::with_quality(JPEG_QUALITY)
    }

    /// Create a codec with a custom quality, clamped to 1-100.
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCodec for JpegCodec {
    fn decode(&self, source: &[u8]) -> Result<DynamicImage, ResizeError> {
        let reader = ImageReader::with_format(Cursor::new(source), image::ImageFormat::Jpeg);

        reader.decode().map_err(|e| ResizeError::Decode {
            message: e.to_string(),
        })
    }

    fn encode(&self, image: &DynamicImage) -> Result<Bytes, ResizeError> {
        let mut output = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut output, self.quality);

        encoder
            .encode_image(image)
            .map_err(|e| ResizeError::Encode {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }
}

// =============================================================================
// Resizing
// =============================================================================

/// Compute output dimensions, filling a zero target from the aspect ratio.
///
/// The derived side is rounded with a 0.3 bias towards the larger value and
/// kept within `[1, MAX_SIZE]`. Both targets zero yields the source size.
pub fn target_dimensions(
    source_width: u32,
    source_height: u32,
    width: u32,
    height: u32,
) -> (u32, u32) {
    let derive = |other_target: u32, other_source: u32, this_source: u32| -> u32 {
        if other_source == 0 {
            return 1;
        }
        let scaled = this_source as f64 * other_target as f64 / other_source as f64;
        let derived = (scaled + 0.7).floor();
        if derived >= f64::from(MAX_SIZE) {
            MAX_SIZE
        } else {
            (derived as u32).max(1)
        }
    };

    match (width, height) {
        (0, 0) => (source_width, source_height),
        (0, h) => (derive(h, source_height, source_width), h),
        (w, 0) => (w, derive(w, source_width, source_height)),
        (w, h) => (w, h),
    }
}

/// Resize an image to the requested dimensions with bilinear interpolation.
pub fn resize_image(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (width, height) = target_dimensions(image.width(), image.height(), width, height);
    image.resize_exact(width, height, RESIZE_FILTER)
}

// =============================================================================
// Tests
// =============================================================================
