/// Estimate the decoded length of an encoded payload without decoding it:
/// `floor(len * 3 / 4) - padding`, saturating at zero.
///
/// Exact for canonical padded base64; an upper bound when the text carries
/// whitespace or line breaks.
///
/// # Example
///
/// ```rust
/// use ai_image_prep::size::estimate_decoded_size;
///
/// let encoded = "A".repeat(98) + "==";
/// assert_eq!(estimate_decoded_size(&encoded, 2), 73);
/// ```
pub fn estimate_decoded_size(encoded: &str, padding: usize) -> usize {
    let len = encoded.len();
    // same as len * 3 / 4 without the overflow
    (len / 4 * 3 + len % 4 * 3 / 4).saturating_sub(padding)
}

/// Count trailing `=` padding characters (at most two).
pub fn base64_padding(encoded: &str) -> usize {
    encoded
        .trim_end()
        .bytes()
        .rev()
        .take_while(|&b| b == b'=')
        .take(2)
        .count()
}

/// [`estimate_decoded_size`] with the padding counted from the text itself.
pub fn estimate_base64_size(encoded: &str) -> usize {
    let encoded = encoded.trim_end();
    estimate_decoded_size(encoded, base64_padding(encoded))
}
