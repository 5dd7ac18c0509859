//! Byte-pattern scanner

/// Find the first occurrence of `needle` in `haystack`.
///
/// The search is bounded by `haystack.len()` and returns `None` when the
/// marker is absent. A partial match never counts: comparison restarts at
/// the next byte after any mismatch.
pub fn find_offset(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
