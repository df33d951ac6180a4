use std::ops::Range;

/// Largest character boundary of `text` that is `<= offset`.
///
/// Offsets past the end clamp to `text.len()`.
pub fn floor_char_boundary(text: &str, offset: usize) -> usize {
    if offset >= text.len() {
        return text.len();
    }
    let mut boundary = offset;
    while !text.is_char_boundary(boundary) {
        boundary -= 1;
    }
    boundary
}

/// Replace `range` of `text` with `replacement`.
///
/// `None` replaces the whole text. Range ends are clamped to the text and
/// moved down to the nearest character boundary; an inverted range becomes
/// an insertion at its start.
pub fn splice(text: &mut String, range: Option<Range<usize>>, replacement: &str) {
    let Some(range) = range else {
        text.clear();
        text.push_str(replacement);
        return;
    };

    let start = floor_char_boundary(text, range.start);
    let end = floor_char_boundary(text, range.end).max(start);
    text.replace_range(start..end, replacement);
}
