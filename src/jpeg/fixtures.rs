//! Hand-assembled JPEG streams for tests.

/// A length-prefixed segment: `FF marker len_hi len_lo payload...`.
pub(crate) fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let length = u16::try_from(payload.len() + 2).unwrap();
    let mut out = vec![0xFF, marker];
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

pub(crate) fn app0_jfif() -> Vec<u8> {
    segment(0xE0, b"JFIF\0\x01\x01\x00\x00\x01\x00\x01\x00\x00")
}

/// APP1 carrying an `Exif\0\0` header padded out to `payload_len` bytes.
pub(crate) fn app1_exif(payload_len: usize) -> Vec<u8> {
    let mut payload = b"Exif\0\0".to_vec();
    payload.resize(payload_len.max(6), 0x2A);
    segment(0xE1, &payload)
}

pub(crate) fn app1_xmp() -> Vec<u8> {
    segment(0xE1, b"http://ns.adobe.com/xap/1.0/\0<x:xmpmeta/>")
}

pub(crate) fn icc_app2() -> Vec<u8> {
    segment(0xE2, b"ICC_PROFILE\0\x01\x01fake-profile")
}

pub(crate) fn dqt() -> Vec<u8> {
    let mut payload = vec![0x00];
    payload.extend(1..=64u8);
    segment(0xDB, &payload)
}

pub(crate) fn dht() -> Vec<u8> {
    let mut payload = vec![0x00];
    payload.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    payload.push(0x00);
    segment(0xC4, &payload)
}

/// Baseline frame header for a single-component image.
pub(crate) fn sof0(width: u16, height: u16) -> Vec<u8> {
    let mut payload = vec![8];
    payload.extend_from_slice(&height.to_be_bytes());
    payload.extend_from_slice(&width.to_be_bytes());
    payload.extend_from_slice(&[1, 1, 0x11, 0]);
    segment(0xC0, &payload)
}

/// SOS header, entropy-coded bytes (with stuffing and a restart marker), EOI.
pub(crate) fn scan() -> Vec<u8> {
    let mut out = segment(0xDA, &[1, 1, 0x00, 0x00, 0x3F, 0x00]);
    out.extend_from_slice(&[0x12, 0xFF, 0x00, 0x34, 0xFF, 0xD0, 0x56, 0xE1, 0xFF, 0x00]);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// SOI followed by `parts` in order.
pub(crate) fn jpeg(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}
