//! Rendering one manifest entry.
//!
//! ```text
//! template ──▶ includes ──▶ content ──▶ urls ──▶ output lines
//!              {/path}      {name}       {@name}
//! ```
//!
//! A [`RenderSession`] holds what stays fixed for a whole run: the `{_now}`
//! timestamp (captured once, so every file in a run agrees), the markup
//! converter, and the inclusion depth limit. Missing files abort the entry
//! being rendered; everything else is a warning.

use crate::content::{ContentContext, resolve_content};
use crate::diagnostics::Reporter;
use crate::include::{DEFAULT_MAX_DEPTH, IncludeError, resolve_includes_with_limit};
use crate::manifest::FileDescriptor;
use crate::markup::{Markdown, MarkupConverter};
use crate::provider::{FileProvider, NoSuchFile};
use crate::urls::resolve_urls;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("/{path}: template {source}")]
    Template { path: String, source: NoSuchFile },
    #[error("/{path}: {source}")]
    Include { path: String, source: IncludeError },
    #[error("/{path}: content {source}")]
    Content { path: String, source: NoSuchFile },
}

impl RenderError {
    /// Output path of the entry that failed.
    pub fn path(&self) -> &str {
        match self {
            RenderError::Template { path, .. }
            | RenderError::Include { path, .. }
            | RenderError::Content { path, .. } => path,
        }
    }
}

/// Seconds since the Unix epoch, as the decimal string `{_now}` renders.
pub fn timestamp_now() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}

/// Settings shared by every render in one run.
pub struct RenderSession {
    now: String,
    markup: Box<dyn MarkupConverter>,
    max_include_depth: usize,
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new(Box::new(Markdown::default()))
    }
}

impl RenderSession {
    /// Start a session now, with the given markup converter.
    pub fn new(markup: Box<dyn MarkupConverter>) -> Self {
        Self {
            now: timestamp_now(),
            markup,
            max_include_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Pin `{_now}` to a fixed value.
    pub fn with_now(mut self, now: impl Into<String>) -> Self {
        self.now = now.into();
        self
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn now(&self) -> &str {
        &self.now
    }

    /// Render `descriptor` to its final lines.
    ///
    /// Fatal errors are also reported to `reporter` before being returned,
    /// so the diagnostics stream tells the whole story of a run.
    pub fn render(
        &self,
        descriptor: &FileDescriptor,
        files: &[FileDescriptor],
        provider: &dyn FileProvider,
        reporter: &mut dyn Reporter,
    ) -> Result<Vec<String>, RenderError> {
        let result = self.render_lines(descriptor, files, provider, reporter);
        if let Err(e) = &result {
            reporter.report(&format!("error: {e}"));
        }
        result
    }

    fn render_lines(
        &self,
        descriptor: &FileDescriptor,
        files: &[FileDescriptor],
        provider: &dyn FileProvider,
        reporter: &mut dyn Reporter,
    ) -> Result<Vec<String>, RenderError> {
        let path = || descriptor.path.clone();

        let template = provider
            .provide(&descriptor.template)
            .map_err(|source| RenderError::Template { path: path(), source })?;

        let included = resolve_includes_with_limit(&template, provider, self.max_include_depth)
            .map_err(|source| RenderError::Include { path: path(), source })?;

        let ctx = ContentContext {
            descriptor,
            provider,
            markup: self.markup.as_ref(),
            now: &self.now,
        };
        let substituted = resolve_content(&included, &ctx, reporter)
            .map_err(|source| RenderError::Content { path: path(), source })?;

        Ok(resolve_urls(&substituted, descriptor, files, reporter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::NoMarkup;
    use crate::provider::MemoryProvider;

    fn site() -> (MemoryProvider, Vec<FileDescriptor>) {
        let provider: MemoryProvider = [
            (
                "page.tpl",
                "<html>\n  <head>{/head.tpl}</head>\n  <body>\n    {body}\n  </body>\n</html>\n",
            ),
            ("head.tpl", "<title>{title}</title><link href=\"{@home}\">"),
            ("home.txt", "title: Home\n\n<p>Welcome</p>\n<p>Again</p>\n"),
            ("about.md", "title: About\n\nAll *about* it.\n"),
            ("broken.tpl", "{/missing.tpl}\n"),
        ]
        .into_iter()
        .collect();
        let files = vec![
            FileDescriptor::new("index.html", "page.tpl")
                .named("home")
                .with_content("body", "home.txt"),
            FileDescriptor::new("about/", "page.tpl").with_content("body", "about.md"),
            FileDescriptor::new("broken.html", "broken.tpl"),
            FileDescriptor::new("lost.html", "nope.tpl"),
            FileDescriptor::new("gone.html", "page.tpl").with_content("body", "gone.txt"),
        ];
        (provider, files)
    }

    #[test]
    fn renders_all_three_tag_kinds() {
        let (provider, files) = site();
        let session = RenderSession::default().with_now("42");
        let mut warnings: Vec<String> = Vec::new();
        let out = session
            .render(&files[0], &files, &provider, &mut warnings)
            .unwrap();
        assert_eq!(
            out.concat(),
            "<html>\n  <head><title>Home</title><link href=\"/index.html\"></head>\n  <body>\n    <p>Welcome</p>\n    <p>Again</p>\n  </body>\n</html>\n"
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn markdown_content_is_converted() {
        let (provider, files) = site();
        let session = RenderSession::default();
        let mut warnings: Vec<String> = Vec::new();
        let out = session
            .render(&files[1], &files, &provider, &mut warnings)
            .unwrap();
        let html = out.concat();
        assert!(html.contains("<title>About</title>"));
        assert!(html.contains("    <p>All <em>about</em> it.</p>\n"));
    }

    #[test]
    fn missing_include_is_fatal_and_reported() {
        let (provider, files) = site();
        let mut warnings: Vec<String> = Vec::new();
        let err = RenderSession::default()
            .render(&files[2], &files, &provider, &mut warnings)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Include {
                source: IncludeError::NoSuchFile(_),
                ..
            }
        ));
        assert_eq!(err.path(), "broken.html");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("error: /broken.html"));
    }

    #[test]
    fn missing_template_is_fatal() {
        let (provider, files) = site();
        let mut warnings: Vec<String> = Vec::new();
        let err = RenderSession::default()
            .render(&files[3], &files, &provider, &mut warnings)
            .unwrap_err();
        match err {
            RenderError::Template { path, source } => {
                assert_eq!(path, "lost.html");
                assert_eq!(source.path, "nope.tpl");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_content_is_fatal() {
        let (provider, files) = site();
        let mut warnings: Vec<String> = Vec::new();
        let err = RenderSession::default()
            .render(&files[4], &files, &provider, &mut warnings)
            .unwrap_err();
        assert_eq!(err.to_string(), "/gone.html: content No such file: gone.txt");
    }

    #[test]
    fn now_is_stable_across_renders() {
        let provider: MemoryProvider = [("t.tpl", "{_now}")].into_iter().collect();
        let files = vec![
            FileDescriptor::new("a.html", "t.tpl"),
            FileDescriptor::new("b.html", "t.tpl"),
        ];
        let session = RenderSession::new(Box::new(NoMarkup));
        let mut warnings: Vec<String> = Vec::new();
        let a = session.render(&files[0], &files, &provider, &mut warnings).unwrap();
        let b = session.render(&files[1], &files, &provider, &mut warnings).unwrap();
        assert_eq!(a, vec![session.now().to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn include_depth_comes_from_session() {
        let provider: MemoryProvider =
            [("a.tpl", "{/b.tpl}"), ("b.tpl", "{/c.tpl}"), ("c.tpl", "c")]
                .into_iter()
                .collect();
        let files = vec![FileDescriptor::new("x.html", "a.tpl")];
        let mut warnings: Vec<String> = Vec::new();
        let err = RenderSession::default()
            .with_max_include_depth(1)
            .render(&files[0], &files, &provider, &mut warnings)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Include {
                source: IncludeError::IncludeTooDeep { limit: 1, .. },
                ..
            }
        ));
    }

    #[test]
    fn timestamp_is_decimal() {
        let now = timestamp_now();
        assert!(!now.is_empty());
        assert!(now.chars().all(|c| c.is_ascii_digit()));
    }
}
