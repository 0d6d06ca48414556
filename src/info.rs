use serde::{Deserialize, Serialize};

use crate::format::{ImageFormat, detect_format};
use crate::jpeg;

/// Width/height offsets inside a PNG whose IHDR directly follows the signature.
const PNG_WIDTH_OFFSET: usize = 16;
const PNG_HEIGHT_OFFSET: usize = 20;
const PNG_SIGNATURE_LEN: usize = 8;

/// Format, pixel dimensions and EXIF presence of an image buffer.
///
/// `width` and `height` are both 0 when they could not be determined. Treat
/// that as "unknown", never as a zero-sized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub has_exif: bool,
}

impl ImageMetadata {
    pub fn has_dimensions(&self) -> bool {
        self.width != 0 && self.height != 0
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Inspect a buffer without decoding it.
///
/// JPEG dimensions come from the first SOFn segment and `has_exif` is set when
/// any APP1 segment is present. PNG dimensions are read from the IHDR fields
/// at offsets 16 and 20. Never fails: unreadable fields come back as zero.
///
/// # Example
///
/// ```rust
/// use ai_image_prep::format::ImageFormat;
/// use ai_image_prep::info::get_image_info;
///
/// let info = get_image_info(&[0xFF]);
/// assert_eq!(info.format, ImageFormat::Unknown);
/// assert_eq!((info.width, info.height, info.has_exif), (0, 0, false));
/// ```
pub fn get_image_info(bytes: &[u8]) -> ImageMetadata {
    match detect_format(bytes) {
        ImageFormat::Jpeg => jpeg_info(bytes),
        ImageFormat::Png => png_info(bytes),
        ImageFormat::Unknown => ImageMetadata::default(),
    }
}

fn jpeg_info(bytes: &[u8]) -> ImageMetadata {
    let walk = jpeg::walk(bytes);
    let (width, height) = walk.frame_dimensions().unwrap_or((0, 0));
    ImageMetadata {
        format: ImageFormat::Jpeg,
        width,
        height,
        has_exif: walk.has_exif(),
    }
}

fn png_info(bytes: &[u8]) -> ImageMetadata {
    let (width, height) = match (
        read_u32_be(bytes, PNG_WIDTH_OFFSET),
        read_u32_be(bytes, PNG_HEIGHT_OFFSET),
    ) {
        (Some(w), Some(h)) => (w, h),
        _ => (0, 0),
    };
    ImageMetadata {
        format: ImageFormat::Png,
        width,
        height,
        has_exif: png_has_exif_chunk(bytes),
    }
}

fn read_u32_be(bytes: &[u8], offset: usize) -> Option<u32> {
    let field = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_be_bytes(field.try_into().ok()?))
}

/// Walk PNG chunks looking for `eXIf`. Only chunks before the image data
/// count: the walk stops at `IDAT`, `IEND`, or the first chunk that would run
/// past the buffer.
fn png_has_exif_chunk(bytes: &[u8]) -> bool {
    let mut pos = PNG_SIGNATURE_LEN;
    while let Some(length) = read_u32_be(bytes, pos) {
        let Some(kind) = bytes.get(pos + 4..pos + 8) else {
            return false;
        };
        match kind {
            b"eXIf" => return true,
            b"IDAT" | b"IEND" => return false,
            _ => {}
        }
        // length + type + data + crc
        let Some(next) = usize::try_from(length)
            .ok()
            .and_then(|len| pos.checked_add(12)?.checked_add(len))
        else {
            return false;
        };
        pos = next;
    }
    false
}
