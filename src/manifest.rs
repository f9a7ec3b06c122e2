//! Manifest parsing.
//!
//! The manifest lists every output file, the template that renders it, and
//! the named content files substituted into that template. Entries are
//! blocks of non-blank lines separated by blank lines:
//!
//! ```text
//! index.html: (home)         # output path, optional name other files link to
//! templates/page.tpl         # template
//! title: content/home.txt    # zero or more `content-name: path` lines
//! body: content/home.md
//!
//! about/
//! templates/page.tpl
//! body: content/about.md
//! ```
//!
//! Leading slashes on paths are dropped. The order inside a block is fixed
//! (path, template, content...) and any line that doesn't fit its position
//! fails the whole manifest; there is no partial result.

use crate::tags::{is_name_char, is_path_char};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid line {line_number}: expecting {expected}, got \"{line}\"")]
    InvalidFormat {
        expected: Field,
        line: String,
        line_number: usize,
    },
    #[error("Found extra definition of content '{name}' in {path}")]
    DuplicateContent { name: String, path: String },
}

/// The field a manifest line was expected to define.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Path,
    Template,
    Content,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Path => "path",
            Field::Template => "template",
            Field::Content => "content",
        })
    }
}

/// One manifest entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileDescriptor {
    /// Output path, relative to the output root. A trailing `/` means a
    /// directory whose index file is written.
    pub path: String,
    /// Identifier other entries reference with `{@name}`. Not unique; the
    /// first entry with a given name wins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Template rendered for this entry.
    pub template: String,
    /// Content-tag name → content path.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, String>,
}

impl FileDescriptor {
    pub fn new(path: &str, template: &str) -> Self {
        Self {
            path: path.trim_start_matches('/').to_string(),
            template: template.trim_start_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_content(mut self, name: &str, path: &str) -> Self {
        self.content
            .insert(name.to_string(), path.trim_start_matches('/').to_string());
        self
    }
}

/// What the next non-blank line of the current block must be.
enum Expect {
    Path,
    Template(FileDescriptor),
    Content(FileDescriptor),
}

/// Parse manifest lines into descriptors, in input order.
pub fn parse<I, S>(lines: I) -> Result<Vec<FileDescriptor>, ManifestError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut files = Vec::new();
    let mut state = Expect::Path;

    for (idx, raw) in lines.into_iter().enumerate() {
        let line = raw.as_ref().trim();
        let line_number = idx + 1;
        let invalid = |expected| ManifestError::InvalidFormat {
            expected,
            line: line.to_string(),
            line_number,
        };

        if line.is_empty() {
            if let Expect::Template(file) | Expect::Content(file) =
                std::mem::replace(&mut state, Expect::Path)
            {
                files.push(file);
            }
            continue;
        }

        state = match state {
            Expect::Path => {
                let (path, name) = parse_path_line(line).ok_or_else(|| invalid(Field::Path))?;
                let mut file = FileDescriptor::new(path, "");
                file.name = name.map(String::from);
                Expect::Template(file)
            }
            Expect::Template(mut file) => {
                let template = whole_path(line).ok_or_else(|| invalid(Field::Template))?;
                file.template = template.trim_start_matches('/').to_string();
                Expect::Content(file)
            }
            Expect::Content(mut file) => {
                let (name, path) =
                    parse_content_line(line).ok_or_else(|| invalid(Field::Content))?;
                if file.content.contains_key(name) {
                    return Err(ManifestError::DuplicateContent {
                        name: name.to_string(),
                        path: file.path,
                    });
                }
                file.content.insert(name.to_string(), path.trim_start_matches('/').to_string());
                Expect::Content(file)
            }
        };
    }

    match state {
        Expect::Template(file) | Expect::Content(file) => files.push(file),
        Expect::Path => {}
    }
    Ok(files)
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<Vec<FileDescriptor>, ManifestError> {
    let text = fs::read_to_string(path)?;
    parse(text.lines())
}

/// Length of the leading run of `line` accepted by `accept`.
fn leading_run(line: &str, accept: fn(char) -> bool) -> usize {
    line.find(|c: char| !accept(c)).unwrap_or(line.len())
}

fn whole_path(line: &str) -> Option<&str> {
    let len = leading_run(line, is_path_char);
    (len > 0 && len == line.len()).then_some(line)
}

/// `path`, `path:` or `path: (name)`. Output paths may not climb out of
/// the output root with `..`.
fn parse_path_line(line: &str) -> Option<(&str, Option<&str>)> {
    let len = leading_run(line, is_path_char);
    if len == 0 {
        return None;
    }
    let (path, rest) = line.split_at(len);
    if path.split('/').any(|segment| segment == "..") {
        return None;
    }
    if rest.is_empty() {
        return Some((path, None));
    }
    let rest = rest.strip_prefix(':')?.trim_start();
    if rest.is_empty() {
        return Some((path, None));
    }
    let name = rest.strip_prefix('(')?.strip_suffix(')')?;
    let name_len = leading_run(name, is_name_char);
    (name_len > 0 && name_len == name.len()).then_some((path, Some(name)))
}

/// `name: path`, with at least one space after the colon.
fn parse_content_line(line: &str) -> Option<(&str, &str)> {
    let len = leading_run(line, is_name_char);
    if len == 0 {
        return None;
    }
    let (name, rest) = line.split_at(len);
    let after_colon = rest.strip_prefix(':')?;
    let path = after_colon.trim_start();
    if path.len() == after_colon.len() {
        return None;
    }
    whole_path(path).map(|path| (name, path))
}
