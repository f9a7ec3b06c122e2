//! File provider: where templates and content come from.
//!
//! The resolvers never touch the filesystem directly. They ask a
//! [`FileProvider`] for the lines of a path, which keeps the core testable
//! against in-memory fixtures and lets the CLI point it at the manifest's
//! directory.
//!
//! Paths are always relative to the provider's root; a leading `/` is
//! ignored, so `{/header.tpl}` and `{//header.tpl}` load the same file.

use crate::splice::split_lines;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A template or content path that could not be loaded.
#[derive(Error, Debug)]
#[error("No such file: {path}")]
pub struct NoSuchFile {
    pub path: String,
    #[source]
    pub source: Option<std::io::Error>,
}

impl NoSuchFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: None,
        }
    }
}

/// Source of template and content lines.
///
/// Implementations must return lines in the shape produced by
/// [`split_lines`]: every line keeps its `\n` except possibly the last.
pub trait FileProvider: Sync {
    fn provide(&self, path: &str) -> Result<Vec<String>, NoSuchFile>;
}

/// Strip the leading slashes a manifest or tag may carry.
pub fn normalize(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Reads files relative to a root directory.
///
/// `\r\n` line endings are read as `\n`.
#[derive(Debug, Clone)]
pub struct DirProvider {
    root: PathBuf,
}

impl DirProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileProvider for DirProvider {
    fn provide(&self, path: &str) -> Result<Vec<String>, NoSuchFile> {
        let full = self.root.join(normalize(path));
        match fs::read_to_string(&full) {
            Ok(text) if text.contains('\r') => Ok(split_lines(&text.replace("\r\n", "\n"))),
            Ok(text) => Ok(split_lines(&text)),
            Err(e) => Err(NoSuchFile {
                path: path.to_string(),
                source: Some(e),
            }),
        }
    }
}

/// In-memory provider keyed by normalized path.
///
/// Used by the test suites and by callers that assemble templates in code.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    files: BTreeMap<String, String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, text: &str) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: &str, text: &str) {
        self.files.insert(normalize(path).to_string(), text.to_string());
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for MemoryProvider {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut provider = Self::new();
        for (path, text) in iter {
            provider.insert(path, text);
        }
        provider
    }
}

impl FileProvider for MemoryProvider {
    fn provide(&self, path: &str) -> Result<Vec<String>, NoSuchFile> {
        self.files
            .get(normalize(path))
            .map(|text| split_lines(text))
            .ok_or_else(|| NoSuchFile::new(path))
    }
}
