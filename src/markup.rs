//! Lightweight markup conversion for content files.
//!
//! A content file whose extension is registered as markup is converted to
//! HTML after its info block is stripped. The conversion is a collaborator
//! behind [`MarkupConverter`]; [`Markdown`] is the built-in one, backed by
//! pulldown-cmark (CommonMark).

use pulldown_cmark::{Options, Parser, html as md_html};
use std::path::Path;

/// Converts the text of markup content files.
pub trait MarkupConverter: Sync {
    /// Whether a content file at `path` should be converted.
    fn handles(&self, path: &str) -> bool;

    /// Convert the full text of a content file.
    fn convert(&self, text: &str) -> String;
}

pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "markdown"];

/// CommonMark to HTML, selected by file extension (case-insensitive).
#[derive(Debug, Clone)]
pub struct Markdown {
    extensions: Vec<String>,
    options: Options,
}

impl Markdown {
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            options: Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
        }
    }
}

impl Default for Markdown {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

impl MarkupConverter for Markdown {
    fn handles(&self, path: &str) -> bool {
        Path::new(path)
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }

    fn convert(&self, text: &str) -> String {
        let parser = Parser::new_ext(text, self.options);
        let mut html = String::with_capacity(text.len() * 3 / 2);
        md_html::push_html(&mut html, parser);
        html
    }
}

/// Leaves every file untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMarkup;

impl MarkupConverter for NoMarkup {
    fn handles(&self, _path: &str) -> bool {
        false
    }

    fn convert(&self, text: &str) -> String {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_registered_extensions() {
        let md = Markdown::default();
        assert!(md.handles("content/about.md"));
        assert!(md.handles("content/ABOUT.MD"));
        assert!(md.handles("notes.markdown"));
        assert!(!md.handles("content/about.txt"));
        assert!(!md.handles("content/md"));
    }

    #[test]
    fn custom_extensions_accept_leading_dot() {
        let md = Markdown::new(&[".mkd"]);
        assert!(md.handles("a.mkd"));
        assert!(!md.handles("a.md"));
    }

    #[test]
    fn converts_paragraphs() {
        let html = Markdown::default().convert("some *text*\n");
        assert_eq!(html, "<p>some <em>text</em></p>\n");
    }

    #[test]
    fn converts_headings_and_lists() {
        let html = Markdown::default().convert("# Title\n\n- one\n- two\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn converts_tables() {
        let html = Markdown::default().convert("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn no_markup_is_identity() {
        assert!(!NoMarkup.handles("a.md"));
        assert_eq!(NoMarkup.convert("*x*"), "*x*");
    }
}
