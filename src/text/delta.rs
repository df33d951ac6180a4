//! Minimal text deltas for incremental document updates.
//!
//! The update service only sends the part of the document that changed since
//! the server last saw it. The delta is the single replace that turns the old
//! text into the new one after stripping the longest common prefix and suffix.

use serde::Serialize;

use super::edits::splice;

/// A single replace operation: `replace_length` bytes at `offset` become `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDelta {
    pub offset: usize,
    pub replace_length: usize,
    pub text: String,
}

/// Compute the delta between `old` and `new`.
///
/// Returns `None` when both texts are equal.
pub fn compute_delta(old: &str, new: &str) -> Option<TextDelta> {
    if old == new {
        return None;
    }

    let prefix = common_prefix_len(old, new);
    // Suffix is measured on the remainders so it never overlaps the prefix
    let suffix = common_suffix_len(&old[prefix..], &new[prefix..]);

    Some(TextDelta {
        offset: prefix,
        replace_length: old.len() - prefix - suffix,
        text: new[prefix..new.len() - suffix].to_string(),
    })
}

/// Apply `delta` to `text`, returning the result.
///
/// A delta reaching past the text is clamped like [`splice`].
pub fn apply_delta(text: &str, delta: &TextDelta) -> String {
    let mut result = text.to_string();
    let end = delta.offset.saturating_add(delta.replace_length);
    splice(&mut result, Some(delta.offset..end), &delta.text);
    result
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((index, _), _)| index)
        .unwrap_or_else(|| a.len().min(b.len()))
}

fn common_suffix_len(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(ca, cb)| ca == cb)
        .map(|(c, _)| c.len_utf8())
        .sum()
}
