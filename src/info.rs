//! Info blocks: `key: value` metadata at the top of a content file.
//!
//! ```text
//! title: Spring show
//! summary: New work, opening April 3rd
//!
//! The gallery is pleased to present...
//! ```
//!
//! The leading run of `key: value` lines is the info block. It ends at the
//! first line that doesn't have that shape (a blank line, usually). Keys are
//! exposed to the template as content tags (`{title}`), and the block itself,
//! plus one blank separator line, is removed before the file's body is
//! substituted.

use std::collections::BTreeMap;

/// Split an info line into trimmed `(key, value)`.
///
/// The key is everything before the first colon and must not be blank.
fn info_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    (!key.is_empty()).then(|| (key, value.trim()))
}

/// Number of leading lines that form the info block.
fn info_len<S: AsRef<str>>(lines: &[S]) -> usize {
    lines
        .iter()
        .take_while(|line| info_line(line.as_ref()).is_some())
        .count()
}

/// Collect the leading info block into a key → value map.
///
/// Only the leading run counts: matching lines after the first non-matching
/// line are body text. A key repeated within the block keeps its last value.
pub fn extract_info<S: AsRef<str>>(lines: &[S]) -> BTreeMap<String, String> {
    lines[..info_len(lines)]
        .iter()
        .filter_map(|line| info_line(line.as_ref()))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// The lines that remain after removing the info block.
///
/// When an info block was present, one blank line directly after it is
/// treated as the separator and removed too.
pub fn strip_info<S: AsRef<str>>(lines: &[S]) -> &[S] {
    let skip = info_len(lines);
    let body = &lines[skip..];
    match body.first() {
        Some(first) if skip > 0 && first.as_ref().trim().is_empty() => &body[1..],
        _ => body,
    }
}
