use serde::{Deserialize, Serialize};
use std::path::Path;

/// JPEG Start Of Image marker.
pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// Leading bytes of the 8-byte PNG signature. Only these four are checked.
pub const PNG_MAGIC: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];

/// Container format of an image buffer, as determined from its magic bytes.
///
/// Serializes as `"jpeg"`, `"png"` or `"unknown"`.
///
/// # Example
///
/// ```rust
/// use ai_image_prep::format::{detect_format, ImageFormat};
///
/// assert_eq!(detect_format(&[0xFF, 0xD8, 0xFF, 0xE0]), ImageFormat::Jpeg);
/// assert_eq!(detect_format(b"GIF89a"), ImageFormat::Unknown);
/// assert_eq!(detect_format(&[]), ImageFormat::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    #[default]
    Unknown,
}

impl ImageFormat {
    /// Guess the format from a file extension. Used to pick candidate files,
    /// never to decide how bytes are parsed.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// MIME type to label the bytes with when handing them to an upload layer.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Unknown => "application/octet-stream",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify raw bytes by their magic number. Never fails; anything too short
/// to carry a signature is [`ImageFormat::Unknown`].
pub fn detect_format(bytes: &[u8]) -> ImageFormat {
    if bytes.starts_with(&JPEG_SOI) {
        ImageFormat::Jpeg
    } else if bytes.starts_with(&PNG_MAGIC) {
        ImageFormat::Png
    } else {
        ImageFormat::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ── detect_format ────────────────────────────────────────────────

    #[test]
    fn detects_jpeg() {
        assert_eq!(detect_format(&[0xFF, 0xD8]), ImageFormat::Jpeg);
        assert_eq!(detect_format(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), ImageFormat::Jpeg);
    }

    #[test]
    fn detects_png() {
        let sig = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_format(&sig), ImageFormat::Png);
        assert_eq!(detect_format(&sig[..4]), ImageFormat::Png);
    }

    #[test]
    fn short_input_is_unknown() {
        assert_eq!(detect_format(&[]), ImageFormat::Unknown);
        assert_eq!(detect_format(&[0xFF]), ImageFormat::Unknown);
        assert_eq!(detect_format(&[0x89, b'P', b'N']), ImageFormat::Unknown);
    }

    #[test]
    fn other_formats_are_unknown() {
        assert_eq!(detect_format(b"GIF89a"), ImageFormat::Unknown);
        assert_eq!(detect_format(b"RIFF\0\0\0\0WEBP"), ImageFormat::Unknown);
        assert_eq!(detect_format(&[0xD8, 0xFF]), ImageFormat::Unknown);
    }

    proptest! {
        #[test]
        fn classification_depends_only_on_magic(bytes in proptest::collection::vec(any::<u8>(), 0..16)) {
            let expected = if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xD8 {
                ImageFormat::Jpeg
            } else if bytes.len() >= 4 && bytes[..4] == [0x89, 0x50, 0x4E, 0x47] {
                ImageFormat::Png
            } else {
                ImageFormat::Unknown
            };
            prop_assert_eq!(detect_format(&bytes), expected);
        }
    }

    // ── ImageFormat helpers ──────────────────────────────────────────

    #[test]
    fn from_path_extensions() {
        assert_eq!(ImageFormat::from_path(Path::new("a.jpg")), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_path(Path::new("a.JPEG")), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_path(Path::new("a.png")), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_path(Path::new("a.webp")), None);
        assert_eq!(ImageFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn mime_types() {
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
        assert_eq!(ImageFormat::Unknown.mime_type(), "application/octet-stream");
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ImageFormat::Jpeg).unwrap(), "\"jpeg\"");
        assert_eq!(serde_json::to_string(&ImageFormat::Unknown).unwrap(), "\"unknown\"");
        assert_eq!(ImageFormat::Png.to_string(), "png");
    }
}
