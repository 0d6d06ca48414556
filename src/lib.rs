//! # ai-image-prep
//!
//! Byte-level preparation of JPEG and PNG images for AI image-generation
//! services: identify the format, read pixel dimensions from the headers,
//! detect EXIF, and strip JPEG APP1 segments without decoding or re-encoding.
//!
//! ## Quick Start
//!
//! ```rust
//! use ai_image_prep::{detect_format, get_image_info, strip_exif, ImageFormat};
//!
//! // SOI, APP1 "Exif", SOF0 100x50, SOS, scan data, EOI
//! let mut jpeg = vec![0xFF, 0xD8];
//! jpeg.extend_from_slice(&[0xFF, 0xE1, 0x00, 0x08, b'E', b'x', b'i', b'f', 0, 0]);
//! jpeg.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 8, 0, 50, 0, 100, 1, 1, 0x11, 0]);
//! jpeg.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 1, 1, 0, 0, 0x3F, 0, 0x12, 0x34, 0xFF, 0xD9]);
//!
//! assert_eq!(detect_format(&jpeg), ImageFormat::Jpeg);
//!
//! let info = get_image_info(&jpeg);
//! assert_eq!((info.width, info.height, info.has_exif), (100, 50, true));
//!
//! let cleaned = strip_exif(&jpeg);
//! assert_eq!(cleaned.len(), jpeg.len() - 10);
//! assert!(!get_image_info(&cleaned).has_exif);
//! ```
//!
//! ## Upload Gate
//!
//! [`validate::prepare_image`] combines the pieces: it rejects empty buffers,
//! unknown formats, and images over the pixel or byte limits (2048×2048 and
//! 10 MiB by default), then returns the EXIF-free bytes.
//!
//! ```rust,no_run
//! use ai_image_prep::validate::{Limits, prepare_image};
//!
//! # fn main() -> anyhow::Result<()> {
//! let bytes = std::fs::read("photo.jpg")?;
//! let prepared = prepare_image(&bytes, &Limits::default())?;
//! println!("{} {}x{}", prepared.mime_type(), prepared.metadata.width, prepared.metadata.height);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`format`]: Magic-byte format detection
//! - [`jpeg`]: Marker-segment walker and EXIF stripper
//! - [`info`]: Dimension and EXIF detection for JPEG and PNG
//! - [`size`]: Decoded-size estimate for base64 payloads
//! - [`validate`]: Pixel/size limits and the prepare step
//! - [`config`]: Configuration types and loading/saving
//! - [`pipeline`]: File collection and per-file processing for the CLI

pub mod config;
pub mod format;
pub mod info;
pub mod jpeg;
pub mod pipeline;
pub mod size;
pub mod validate;

pub use format::{ImageFormat, detect_format};
pub use info::{ImageMetadata, get_image_info};
pub use jpeg::strip_exif;
pub use size::estimate_decoded_size;
