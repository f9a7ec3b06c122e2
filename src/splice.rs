//! Line-level text utilities shared by every resolver.
//!
//! All substitution works on ordered sequences of lines rather than whole-file
//! strings. A line keeps its trailing `\n`; only the last line of a file may
//! lack one. [`split_lines`] produces that shape from raw text and [`splice`]
//! merges a (possibly multi-line) replacement into the position of a single
//! tag on a single line.
//!
//! ## Splicing
//!
//! ```text
//! line:         "    <p>{text}</p>\n"
//! replacement:  ["first\n", "second\n"]
//!
//! result:       ["    <p>first\n",
//!                "    second</p>\n"]
//! ```
//!
//! The tag line's leading whitespace is repeated on every produced line so a
//! multi-line replacement inherits the indentation of the tag.

/// Split text into lines, keeping each line's `\n`.
///
/// The final segment is kept without a newline if the text does not end in
/// one. Empty text yields no lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(String::from).collect()
}

/// Merge `replacement` into the position between `prefix` and `suffix`.
///
/// Returns an empty sequence when `replacement` is empty: the tag line is
/// dropped entirely, surrounding text included.
pub fn splice<S: AsRef<str>>(prefix: &str, suffix: &str, replacement: &[S]) -> Vec<String> {
    if replacement.is_empty() {
        return Vec::new();
    }

    let text_start = prefix
        .find(|c: char| !c.is_whitespace())
        .unwrap_or(prefix.len());
    let (indent, lead) = prefix.split_at(text_start);

    let mut lines: Vec<String> = replacement.iter().map(|l| l.as_ref().to_string()).collect();
    lines[0].insert_str(0, lead);

    let last = lines.len() - 1;
    if lines[last].ends_with('\n') {
        lines[last].pop();
    }
    lines[last].push_str(suffix);

    if !indent.is_empty() {
        for line in &mut lines {
            line.insert_str(0, indent);
        }
    }
    lines
}
