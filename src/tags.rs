//! Tag scanner.
//!
//! Templates and content embed three kinds of inline marker:
//!
//! | Kind | Syntax | Name characters |
//! |------|--------|-----------------|
//! | [`TagKind::Include`] | `{/path}` | `[-a-zA-Z0-9_./]` |
//! | [`TagKind::Content`] | `{name}` | word characters and `-` |
//! | [`TagKind::Url`] | `{@name}` | word characters and `-` |
//!
//! Each resolver asks for the *first* tag of its kind at or after a byte
//! offset. Braces that don't form a well-shaped tag are skipped, so `{{text}}`
//! finds `{text}` and `{ text }` finds nothing.

/// The three tag kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Include,
    Content,
    Url,
}

impl TagKind {
    fn sigil(self) -> Option<char> {
        match self {
            TagKind::Include => Some('/'),
            TagKind::Content => None,
            TagKind::Url => Some('@'),
        }
    }

    fn accepts(self, c: char) -> bool {
        match self {
            TagKind::Include => is_path_char(c),
            TagKind::Content | TagKind::Url => is_name_char(c),
        }
    }
}

/// A tag located within one line. `start..end` spans the braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    pub kind: TagKind,
    pub name: &'a str,
    pub start: usize,
    pub end: usize,
}

impl<'a> Tag<'a> {
    /// Text of `line` before the tag.
    pub fn prefix<'l>(&self, line: &'l str) -> &'l str {
        &line[..self.start]
    }

    /// Text of `line` after the tag, newline included.
    pub fn suffix<'l>(&self, line: &'l str) -> &'l str {
        &line[self.end..]
    }
}

/// Characters allowed in manifest and inclusion paths.
pub fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/')
}

/// Characters allowed in content and descriptor names.
pub fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Find the first tag of `kind` starting at byte offset `from`.
///
/// `from` must lie on a char boundary; the end of a previous tag always does.
pub fn find_tag(line: &str, kind: TagKind, from: usize) -> Option<Tag<'_>> {
    line[from..]
        .match_indices('{')
        .find_map(|(offset, _)| tag_at(line, from + offset, kind))
}

/// Iterate over every tag of `kind` in `line`, left to right.
pub fn tags(line: &str, kind: TagKind) -> impl Iterator<Item = Tag<'_>> {
    let mut from = 0;
    std::iter::from_fn(move || {
        let tag = find_tag(line, kind, from)?;
        from = tag.end;
        Some(tag)
    })
}

fn tag_at(line: &str, open: usize, kind: TagKind) -> Option<Tag<'_>> {
    let after_brace = &line[open + 1..];
    let body = match kind.sigil() {
        Some(sigil) => after_brace.strip_prefix(sigil)?,
        None => after_brace,
    };
    let len = body.find(|c: char| !kind.accepts(c)).unwrap_or(body.len());
    if len == 0 || !body[len..].starts_with('}') {
        return None;
    }
    let name_start = line.len() - body.len();
    Some(Tag {
        kind,
        name: &line[name_start..name_start + len],
        start: open,
        end: name_start + len + 1,
    })
}
