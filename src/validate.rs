//! Upload gate: size and pixel limits, plus EXIF stripping.
//!
//! The checks here run entirely on header bytes. An empty buffer is the only
//! input rejected before the format is even looked at.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::ImageFormat;
use crate::info::{ImageMetadata, get_image_info};
use crate::jpeg::{StripOutcome, strip_exif_report};
use crate::size::estimate_base64_size;

/// Largest accepted side for a square image (2048×2048).
pub const MAX_DIMENSION: u32 = 2048;
pub const DEFAULT_MAX_PIXELS: u64 = MAX_DIMENSION as u64 * MAX_DIMENSION as u64;
/// 10 MiB.
pub const DEFAULT_MAX_DECODED_BYTES: u64 = 10 * 1024 * 1024;

/// Limits enforced by [`check_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum `width * height`.
    pub max_pixels: u64,
    /// Maximum size of the raw image bytes.
    pub max_decoded_bytes: u64,
    /// Reject images whose dimensions could not be read instead of letting them through.
    pub require_known_dimensions: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_PIXELS,
            max_decoded_bytes: DEFAULT_MAX_DECODED_BYTES,
            require_known_dimensions: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("image buffer is empty")]
    InvalidInput,

    #[error("unsupported image format (expected JPEG or PNG)")]
    UnsupportedFormat,

    #[error("could not determine {0} image dimensions")]
    UnknownDimensions(ImageFormat),

    #[error("image is {width}x{height} ({pixels} pixels), limit is {max} pixels")]
    TooManyPixels {
        width: u32,
        height: u32,
        pixels: u64,
        max: u64,
    },

    #[error("image is {size} bytes, limit is {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// An image that passed the gate, with EXIF already removed.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub data: Vec<u8>,
    /// Metadata of `data` (so `has_exif` is false for stripped JPEGs).
    pub metadata: ImageMetadata,
    pub strip: StripOutcome,
}

impl PreparedImage {
    pub fn mime_type(&self) -> &'static str {
        self.metadata.format.mime_type()
    }
}

/// Check `bytes` against `limits` and return what was learned about them.
pub fn check_image(bytes: &[u8], limits: &Limits) -> Result<ImageMetadata, ValidationError> {
    if bytes.is_empty() {
        return Err(ValidationError::InvalidInput);
    }

    let size = bytes.len() as u64;
    if size > limits.max_decoded_bytes {
        return Err(ValidationError::TooLarge {
            size,
            max: limits.max_decoded_bytes,
        });
    }

    let info = get_image_info(bytes);
    if info.format == ImageFormat::Unknown {
        return Err(ValidationError::UnsupportedFormat);
    }

    if !info.has_dimensions() {
        if limits.require_known_dimensions {
            return Err(ValidationError::UnknownDimensions(info.format));
        }
        log::warn!("Accepting {} image with unknown dimensions", info.format);
        return Ok(info);
    }

    let pixels = info.pixel_count();
    if pixels > limits.max_pixels {
        return Err(ValidationError::TooManyPixels {
            width: info.width,
            height: info.height,
            pixels,
            max: limits.max_pixels,
        });
    }

    Ok(info)
}

/// Run [`check_image`], then strip EXIF. The returned metadata describes the
/// stripped bytes.
///
/// # Example
///
/// ```rust
/// use ai_image_prep::validate::{Limits, ValidationError, prepare_image};
///
/// let err = prepare_image(&[], &Limits::default()).unwrap_err();
/// assert!(matches!(err, ValidationError::InvalidInput));
/// ```
pub fn prepare_image(bytes: &[u8], limits: &Limits) -> Result<PreparedImage, ValidationError> {
    check_image(bytes, limits)?;

    let stripped = strip_exif_report(bytes);
    let metadata = get_image_info(&stripped.data);
    Ok(PreparedImage {
        data: stripped.data,
        metadata,
        strip: stripped.outcome,
    })
}

/// Decode a base64 image payload, refusing oversized payloads before
/// decoding. Accepts an optional `data:<mime>;base64,` prefix.
pub fn decode_base64_image(text: &str, limits: &Limits) -> Result<Vec<u8>, ValidationError> {
    let payload = strip_data_url(text).trim();
    if payload.is_empty() {
        return Err(ValidationError::InvalidInput);
    }

    let estimate = estimate_base64_size(payload) as u64;
    if estimate > limits.max_decoded_bytes {
        return Err(ValidationError::TooLarge {
            size: estimate,
            max: limits.max_decoded_bytes,
        });
    }

    Ok(STANDARD.decode(payload)?)
}

fn strip_data_url(text: &str) -> &str {
    match text.strip_prefix("data:") {
        Some(rest) => rest.split_once(";base64,").map_or(text, |(_, payload)| payload),
        None => text,
    }
}
