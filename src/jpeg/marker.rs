use crate::format::JPEG_SOI;

/// Temporary private-use marker; standalone like RSTn/SOI/EOI.
pub const TEM: u8 = 0x01;
pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const APP1: u8 = 0xE1;

/// A JPEG marker, classified by the byte that follows `0xFF`.
///
/// Only the markers the walker acts on get their own variant; everything else
/// is carried as [`Marker::Other`] and copied through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// RSTn, SOI, EOI or TEM. Two bytes, no length field.
    Standalone(u8),
    /// APP1. Treated as EXIF regardless of its identifier string.
    App1,
    /// SOFn. Carries the frame height and width.
    StartOfFrame(u8),
    /// SOS. Everything from here to the end of the buffer is entropy-coded data.
    StartOfScan,
    /// Any other length-prefixed segment (APPn, DQT, DHT, COM, DRI, ...).
    Other(u8),
}

impl Marker {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            TEM | 0xD0..=EOI => Self::Standalone(byte),
            SOS => Self::StartOfScan,
            APP1 => Self::App1,
            // 0xC4 (DHT), 0xC8 (JPG) and 0xCC (DAC) share the range but are not frames
            0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => Self::StartOfFrame(byte),
            _ => Self::Other(byte),
        }
    }

    pub fn byte(self) -> u8 {
        match self {
            Self::Standalone(b) | Self::StartOfFrame(b) | Self::Other(b) => b,
            Self::App1 => APP1,
            Self::StartOfScan => SOS,
        }
    }

    /// Whether the segment carries a big-endian length field after the marker.
    pub fn has_length(self) -> bool {
        !matches!(self, Self::Standalone(_) | Self::StartOfScan)
    }
}

/// Boundaries of one marker segment within the walked buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSegment {
    pub marker: u8,
    /// Offset of the first byte of the segment (including any `0xFF` fill bytes).
    pub offset: usize,
    /// Total bytes spanned: 2 for standalone markers, otherwise fill + 2 + length field.
    pub length: usize,
}

/// A walked segment: its marker plus a borrowed view of its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub marker: Marker,
    pub offset: usize,
    /// Number of `0xFF` fill bytes preceding the marker's own `0xFF`.
    pub fill: usize,
    /// The whole segment, fill bytes and marker included.
    pub bytes: &'a [u8],
}

impl Segment<'_> {
    pub fn info(&self) -> MarkerSegment {
        MarkerSegment {
            marker: self.marker.byte(),
            offset: self.offset,
            length: self.bytes.len(),
        }
    }

    pub fn is_exif(&self) -> bool {
        self.marker == Marker::App1
    }

    /// Segment payload after the marker and length field. Empty for standalone markers.
    pub fn payload(&self) -> &[u8] {
        if self.marker.has_length() {
            self.bytes.get(self.fill + 4..).unwrap_or_default()
        } else {
            &[]
        }
    }

    /// `(width, height)` for a SOFn segment whose header fits inside the
    /// declared length. Height sits at marker offset + 5, width at + 7.
    pub fn frame_dimensions(&self) -> Option<(u32, u32)> {
        if !matches!(self.marker, Marker::StartOfFrame(_)) {
            return None;
        }
        let header = self.bytes.get(self.fill..)?;
        let height = u16::from_be_bytes([*header.get(5)?, *header.get(6)?]);
        let width = u16::from_be_bytes([*header.get(7)?, *header.get(8)?]);
        Some((u32::from(width), u32::from(height)))
    }
}

/// How a walk ended. Every variant is a normal terminal state, not an error;
/// only [`WalkEnd::StartOfScan`] means the header section was fully accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEnd {
    /// Reached SOS at `offset` (the first byte of its marker run).
    StartOfScan { offset: usize },
    /// Ran out of bytes exactly on a segment boundary without seeing SOS.
    EndOfBuffer,
    /// Found something other than a marker where one was expected, or a
    /// length field smaller than itself.
    Malformed { offset: usize },
    /// A segment starting at `offset` runs past the end of the buffer.
    Truncated { offset: usize },
}

impl std::fmt::Display for WalkEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartOfScan { offset } => write!(f, "start of scan at offset {offset}"),
            Self::EndOfBuffer => f.write_str("end of buffer before start of scan"),
            Self::Malformed { offset } => write!(f, "malformed marker at offset {offset}"),
            Self::Truncated { offset } => write!(f, "truncated segment at offset {offset}"),
        }
    }
}

/// Result of walking the header section of a JPEG stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk<'a> {
    segments: Vec<Segment<'a>>,
    end: WalkEnd,
}

impl<'a> Walk<'a> {
    /// Segments between SOI and SOS, in stream order.
    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    pub fn end(&self) -> WalkEnd {
        self.end
    }

    /// The offset of SOS, if the walk reached it.
    pub fn scan_offset(&self) -> Option<usize> {
        match self.end {
            WalkEnd::StartOfScan { offset } => Some(offset),
            _ => None,
        }
    }

    pub fn exif_segments(&self) -> impl Iterator<Item = &Segment<'a>> {
        self.segments.iter().filter(|s| s.is_exif())
    }

    pub fn has_exif(&self) -> bool {
        self.segments.iter().any(Segment::is_exif)
    }

    /// Dimensions from the first SOFn segment.
    pub fn frame_dimensions(&self) -> Option<(u32, u32)> {
        self.segments
            .iter()
            .find(|s| matches!(s.marker, Marker::StartOfFrame(_)))
            .and_then(Segment::frame_dimensions)
    }
}

/// Walk the marker segments of a JPEG stream, starting right after SOI.
///
/// The caller is expected to have checked the SOI signature; the first two
/// bytes are skipped unconditionally. The walk never fails: it stops at SOS,
/// at the end of the buffer, or at the first structural anomaly, and returns
/// whatever it collected along with the reason it stopped.
pub fn walk(data: &[u8]) -> Walk<'_> {
    let mut segments = Vec::new();
    let mut pos = JPEG_SOI.len();

    let end = loop {
        if pos >= data.len() {
            break WalkEnd::EndOfBuffer;
        }
        if data[pos] != 0xFF {
            break WalkEnd::Malformed { offset: pos };
        }

        let start = pos;
        let mut cursor = pos + 1;
        while data.get(cursor) == Some(&0xFF) {
            cursor += 1;
        }
        let Some(&byte) = data.get(cursor) else {
            break WalkEnd::Truncated { offset: start };
        };
        // 0xFF00 is byte stuffing and only legal inside entropy-coded data
        if byte == 0x00 {
            break WalkEnd::Malformed { offset: start };
        }

        let marker = Marker::from_byte(byte);
        let segment_end = match marker {
            Marker::StartOfScan => break WalkEnd::StartOfScan { offset: start },
            Marker::Standalone(_) => cursor + 1,
            Marker::App1 | Marker::StartOfFrame(_) | Marker::Other(_) => {
                let Some(len) = data.get(cursor + 1..cursor + 3) else {
                    break WalkEnd::Truncated { offset: start };
                };
                let length = usize::from(u16::from_be_bytes([len[0], len[1]]));
                if length < 2 {
                    break WalkEnd::Malformed { offset: start };
                }
                let segment_end = cursor + 1 + length;
                if segment_end > data.len() {
                    break WalkEnd::Truncated { offset: start };
                }
                segment_end
            }
        };

        segments.push(Segment {
            marker,
            offset: start,
            fill: cursor - 1 - start,
            bytes: &data[start..segment_end],
        });
        pos = segment_end;
    };

    if !matches!(end, WalkEnd::StartOfScan { .. }) {
        log::debug!("JPEG walk stopped early: {end} ({} segments)", segments.len());
    }

    Walk { segments, end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jpeg::fixtures::*;

    // ── Marker::from_byte ────────────────────────────────────────────

    #[test]
    fn classifies_markers() {
        assert_eq!(Marker::from_byte(0xD0), Marker::Standalone(0xD0));
        assert_eq!(Marker::from_byte(0xD9), Marker::Standalone(0xD9));
        assert_eq!(Marker::from_byte(0x01), Marker::Standalone(0x01));
        assert_eq!(Marker::from_byte(0xDA), Marker::StartOfScan);
        assert_eq!(Marker::from_byte(0xE1), Marker::App1);
        assert_eq!(Marker::from_byte(0xE0), Marker::Other(0xE0));
        assert_eq!(Marker::from_byte(0xDB), Marker::Other(0xDB));
    }

    #[test]
    fn frame_family_excludes_tables() {
        for b in [0xC0, 0xC1, 0xC2, 0xC3, 0xC5, 0xC6, 0xC7, 0xC9, 0xCA, 0xCB, 0xCD, 0xCE, 0xCF] {
            assert_eq!(Marker::from_byte(b), Marker::StartOfFrame(b), "0x{b:02X}");
        }
        assert_eq!(Marker::from_byte(0xC4), Marker::Other(0xC4));
        assert_eq!(Marker::from_byte(0xC8), Marker::Other(0xC8));
        assert_eq!(Marker::from_byte(0xCC), Marker::Other(0xCC));
    }

    #[test]
    fn marker_byte_roundtrips() {
        for b in 0x01..=0xFEu8 {
            assert_eq!(Marker::from_byte(b).byte(), b);
        }
    }

    // ── walk ─────────────────────────────────────────────────────────

    #[test]
    fn walks_to_start_of_scan() {
        let app0 = app0_jfif();
        let dqt = dqt();
        let sof = sof0(100, 50);
        let data = jpeg(&[&app0, &dqt, &sof, &scan()]);

        let walk = walk(&data);
        let infos: Vec<MarkerSegment> = walk.segments().iter().map(Segment::info).collect();
        assert_eq!(
            infos,
            vec![
                MarkerSegment { marker: 0xE0, offset: 2, length: app0.len() },
                MarkerSegment { marker: 0xDB, offset: 2 + app0.len(), length: dqt.len() },
                MarkerSegment { marker: 0xC0, offset: 2 + app0.len() + dqt.len(), length: sof.len() },
            ]
        );
        let sos = 2 + app0.len() + dqt.len() + sof.len();
        assert_eq!(walk.end(), WalkEnd::StartOfScan { offset: sos });
        assert_eq!(walk.scan_offset(), Some(sos));
    }

    #[test]
    fn flags_app1_segments() {
        let data = jpeg(&[&app1_exif(16), &app0_jfif(), &app1_xmp(), &scan()]);
        let walk = walk(&data);
        assert!(walk.has_exif());
        assert_eq!(walk.exif_segments().count(), 2);
        assert_eq!(walk.exif_segments().next().map(|s| s.bytes.len()), Some(20));
    }

    #[test]
    fn reads_frame_dimensions() {
        let data = jpeg(&[&app0_jfif(), &sof0(100, 50), &scan()]);
        assert_eq!(walk(&data).frame_dimensions(), Some((100, 50)));
    }

    #[test]
    fn first_frame_wins() {
        let data = jpeg(&[&sof0(10, 20), &sof0(30, 40), &scan()]);
        assert_eq!(walk(&data).frame_dimensions(), Some((10, 20)));
    }

    #[test]
    fn short_frame_header_has_no_dimensions() {
        let data = jpeg(&[&segment(0xC0, &[8, 0, 50]), &scan()]);
        let walk = walk(&data);
        assert!(walk.scan_offset().is_some());
        assert_eq!(walk.frame_dimensions(), None);
    }

    #[test]
    fn standalone_markers_take_two_bytes() {
        let data = jpeg(&[&[0xFF, 0xD0], &app0_jfif(), &scan()]);
        let walk = walk(&data);
        assert_eq!(walk.segments()[0].info(), MarkerSegment { marker: 0xD0, offset: 2, length: 2 });
        assert!(walk.segments()[0].payload().is_empty());
        assert_eq!(walk.segments()[1].offset, 4);
    }

    #[test]
    fn fill_bytes_belong_to_next_segment() {
        let sof = sof0(64, 48);
        let mut padded = vec![0xFF, 0xFF];
        padded.extend_from_slice(&sof);
        let data = jpeg(&[&padded, &scan()]);

        let walk = walk(&data);
        let seg = walk.segments()[0];
        assert_eq!(seg.fill, 2);
        assert_eq!(seg.bytes.len(), sof.len() + 2);
        assert_eq!(seg.frame_dimensions(), Some((64, 48)));
        assert_eq!(walk.scan_offset(), Some(2 + padded.len()));
    }

    #[test]
    fn payload_skips_marker_and_length() {
        let data = jpeg(&[&segment(0xFE, b"hello"), &scan()]);
        assert_eq!(walk(&data).segments()[0].payload(), b"hello");
    }

    // ── anomalies ────────────────────────────────────────────────────

    #[test]
    fn non_marker_byte_stops_walk() {
        let app0 = app0_jfif();
        let data = jpeg(&[&app0, &[0x12, 0x34], &scan()]);
        let walk = walk(&data);
        assert_eq!(walk.segments().len(), 1);
        assert_eq!(walk.end(), WalkEnd::Malformed { offset: 2 + app0.len() });
    }

    #[test]
    fn stuffed_zero_outside_scan_is_malformed() {
        let data = jpeg(&[&[0xFF, 0x00], &scan()]);
        assert_eq!(walk(&data).end(), WalkEnd::Malformed { offset: 2 });
    }

    #[test]
    fn undersized_length_is_malformed() {
        let data = jpeg(&[&[0xFF, 0xE0, 0x00, 0x01], &scan()]);
        assert_eq!(walk(&data).end(), WalkEnd::Malformed { offset: 2 });
    }

    #[test]
    fn overlong_segment_is_truncated() {
        let app0 = app0_jfif();
        let data = jpeg(&[&app0, &[0xFF, 0xE1, 0x10, 0x00, 0x00]]);
        let walk = walk(&data);
        assert_eq!(walk.segments().len(), 1);
        assert_eq!(walk.end(), WalkEnd::Truncated { offset: 2 + app0.len() });
        assert!(!walk.has_exif());
    }

    #[test]
    fn missing_length_is_truncated() {
        assert_eq!(walk(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]).end(), WalkEnd::Truncated { offset: 2 });
        assert_eq!(walk(&[0xFF, 0xD8, 0xFF]).end(), WalkEnd::Truncated { offset: 2 });
    }

    #[test]
    fn headers_without_scan_end_at_buffer() {
        let data = jpeg(&[&app0_jfif(), &sof0(8, 8)]);
        let walk = walk(&data);
        assert_eq!(walk.end(), WalkEnd::EndOfBuffer);
        assert_eq!(walk.frame_dimensions(), Some((8, 8)));
    }

    #[test]
    fn bare_soi_is_empty_walk() {
        let walk = walk(&[0xFF, 0xD8]);
        assert!(walk.segments().is_empty());
        assert_eq!(walk.end(), WalkEnd::EndOfBuffer);
    }
}
