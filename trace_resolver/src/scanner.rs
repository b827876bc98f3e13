//! Recognition of stack-frame lines in a crash trace.
//!
//! A frame line looks like:
//!
//! ```text
//!    3:       sp: 0x80001100  ra: 0x80002100
//! ```
//!
//! Everything else in a trace (banners, register dumps, blank lines) is
//! skipped without comment.

/// Marker preceding the return address.
const RA_MARKER: &str = "ra:";

/// Longest accepted frame index, in digits.
const MAX_INDEX_DIGITS: usize = 3;

/// A frame index and return address borrowed from a trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRecord<'a> {
    /// Frame index including its trailing colon, e.g. `"12:"`.
    pub index: &'a str,
    /// Return address including the `0x` prefix, case preserved.
    pub address: &'a str,
}

/// Extract the frame index and return address from a trace line.
///
/// Returns `None` for any line that is not a frame record. When more than one
/// `ra:` marker is followed by an address, the right-most one is taken.
pub fn scan_line(line: &str) -> Option<FrameRecord<'_>> {
    let line = line.trim_start();
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if !(1..=MAX_INDEX_DIGITS).contains(&digits) || line.as_bytes().get(digits) != Some(&b':') {
        return None;
    }
    let (index, rest) = line.split_at(digits + 1);

    // One whitespace character, then at least one more character before the marker.
    let first = rest.chars().next().filter(|c| c.is_whitespace())?;
    let min_marker_pos = first.len_utf8() + 1;

    rest.rmatch_indices(RA_MARKER)
        .filter(|&(pos, _)| pos >= min_marker_pos)
        .find_map(|(pos, _)| hex_address_after(&rest[pos + RA_MARKER.len()..]))
        .map(|address| FrameRecord { index, address })
}

/// Parse `<whitespace>+0x<hex>+` at the start of `text`, returning the address.
fn hex_address_after(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    if trimmed.len() == text.len() {
        return None;
    }
    let hex = trimmed.strip_prefix("0x")?;
    let hex_len = hex.bytes().take_while(u8::is_ascii_hexdigit).count();
    (hex_len > 0).then(|| &trimmed[..2 + hex_len])
}
