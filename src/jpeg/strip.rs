use super::marker::{WalkEnd, walk};
use crate::format::{ImageFormat, JPEG_SOI, detect_format};

/// Why the stripper returned its input untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passthrough {
    /// Not a JPEG stream; PNG and unknown input are never rewritten.
    NotJpeg(ImageFormat),
    /// The marker walk did not reach SOS cleanly.
    Anomaly(WalkEnd),
}

impl std::fmt::Display for Passthrough {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotJpeg(format) => write!(f, "not a JPEG ({format})"),
            Self::Anomaly(end) => write!(f, "JPEG markers unreadable: {end}"),
        }
    }
}

/// Which branch the stripper took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripOutcome {
    /// `segments` APP1 segments totalling `bytes` bytes were dropped.
    Stripped { segments: usize, bytes: usize },
    /// Well-formed JPEG with no APP1 segments.
    Clean,
    Passthrough(Passthrough),
}

impl StripOutcome {
    pub fn removed_bytes(&self) -> usize {
        match self {
            Self::Stripped { bytes, .. } => *bytes,
            _ => 0,
        }
    }
}

/// Output buffer plus the branch that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripped {
    pub data: Vec<u8>,
    pub outcome: StripOutcome,
}

impl Stripped {
    fn unchanged(bytes: &[u8], outcome: StripOutcome) -> Self {
        Self {
            data: bytes.to_vec(),
            outcome,
        }
    }
}

/// Return a copy of `bytes` with every APP1 segment removed.
///
/// All other segments and the entire scan (SOS through EOI) are copied
/// verbatim and in order. Non-JPEG input, and JPEG input whose header section
/// cannot be walked cleanly up to SOS, come back unmodified.
///
/// # Example
///
/// ```rust
/// use ai_image_prep::jpeg::strip_exif;
///
/// let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
/// assert_eq!(strip_exif(&png), png);
/// ```
pub fn strip_exif(bytes: &[u8]) -> Vec<u8> {
    strip_exif_report(bytes).data
}

/// Like [`strip_exif`], but also reports which branch was taken.
pub fn strip_exif_report(bytes: &[u8]) -> Stripped {
    let format = detect_format(bytes);
    if format != ImageFormat::Jpeg {
        return Stripped::unchanged(bytes, StripOutcome::Passthrough(Passthrough::NotJpeg(format)));
    }

    let walk = walk(bytes);
    let scan_offset = match walk.end() {
        WalkEnd::StartOfScan { offset } => offset,
        end => {
            log::debug!("Leaving JPEG untouched: {end}");
            return Stripped::unchanged(bytes, StripOutcome::Passthrough(Passthrough::Anomaly(end)));
        }
    };

    let (segments, removed) = walk
        .exif_segments()
        .fold((0, 0), |(count, total), s| (count + 1, total + s.bytes.len()));
    if segments == 0 {
        return Stripped::unchanged(bytes, StripOutcome::Clean);
    }

    let mut data = Vec::with_capacity(bytes.len() - removed);
    data.extend_from_slice(&JPEG_SOI);
    for segment in walk.segments().iter().filter(|s| !s.is_exif()) {
        data.extend_from_slice(segment.bytes);
    }
    data.extend_from_slice(&bytes[scan_offset..]);

    log::debug!("Removed {segments} APP1 segment(s), {removed} bytes");
    Stripped {
        data,
        outcome: StripOutcome::Stripped { segments, bytes: removed },
    }
}
