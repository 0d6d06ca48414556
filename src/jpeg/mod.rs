//! Byte-level JPEG handling.
//!
//! - [`walk`]: sequential marker-segment walk over the header section
//! - [`strip_exif`]: rebuild the stream without APP1 segments
//!
//! Nothing here decodes pixel data. Everything after SOS is treated as opaque.

mod marker;
mod strip;

#[cfg(test)]
pub(crate) mod fixtures;

pub use marker::{APP1, EOI, Marker, MarkerSegment, SOI, SOS, Segment, TEM, Walk, WalkEnd, walk};
pub use strip::{Passthrough, StripOutcome, Stripped, strip_exif, strip_exif_report};
