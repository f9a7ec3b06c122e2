//! Content substitution: `{name}` tags.
//!
//! A content tag resolves, in order, to:
//!
//! 1. `{_now}`: the session timestamp.
//! 2. A content file mapped to `name` in the manifest entry. Its info block
//!    is stripped, markup files are converted, and the remaining lines are
//!    spliced in place of the tag.
//! 3. A key from the info blocks of the content files this template uses
//!    (`{title}` from a `title: ...` line). When several files define the
//!    same key, the file whose tag appears first in the template wins.
//! 4. Nothing: a warning is reported and the tag is left as written.
//!
//! Only the first content tag on a line is looked at, for info as well as
//! substitution; a line with more gets a warning. A content file that cannot
//! be loaded is fatal.

use crate::diagnostics::Reporter;
use crate::info::{extract_info, strip_info};
use crate::manifest::FileDescriptor;
use crate::markup::MarkupConverter;
use crate::provider::{FileProvider, NoSuchFile};
use crate::splice::{splice, split_lines};
use crate::tags::{TagKind, find_tag};
use std::collections::{BTreeMap, HashMap};

/// Reserved content name resolving to the session timestamp.
pub const NOW_TAG: &str = "_now";

/// Everything content substitution needs besides the lines themselves.
pub struct ContentContext<'a> {
    pub descriptor: &'a FileDescriptor,
    pub provider: &'a dyn FileProvider,
    pub markup: &'a dyn MarkupConverter,
    /// Value of `{_now}`.
    pub now: &'a str,
}

/// How a content tag resolved.
enum Substitution {
    Lines(Vec<String>),
    NoMapping,
}

/// Content files loaded during one substitution run, keyed by path.
#[derive(Default)]
struct Sources {
    loaded: HashMap<String, Vec<String>>,
}

impl Sources {
    fn load(&mut self, provider: &dyn FileProvider, path: &str) -> Result<&[String], NoSuchFile> {
        if !self.loaded.contains_key(path) {
            let lines = provider.provide(path)?;
            self.loaded.insert(path.to_string(), lines);
        }
        Ok(&self.loaded[path])
    }
}

/// Substitute content tags in `lines`.
pub fn resolve_content<S: AsRef<str>>(
    lines: &[S],
    ctx: &ContentContext<'_>,
    reporter: &mut dyn Reporter,
) -> Result<Vec<String>, NoSuchFile> {
    let mut sources = Sources::default();
    let info = collect_info(lines, ctx, &mut sources)?;

    let mut out = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let Some(tag) = find_tag(line, TagKind::Content, 0) else {
            out.push(line.to_string());
            continue;
        };

        if find_tag(line, TagKind::Content, tag.end).is_some() {
            reporter.report(&format!(
                "warning: multiple content tags on line {} of /{}, only the first will be replaced",
                idx + 1,
                ctx.descriptor.path
            ));
        }

        match substitute(tag.name, ctx, &info, &mut sources)? {
            Substitution::Lines(replacement) => {
                out.extend(splice(tag.prefix(line), tag.suffix(line), &replacement));
            }
            Substitution::NoMapping => {
                reporter.report(&format!(
                    "warning: found content {{{}}} in template {} for /{}, but there's no associated file or info",
                    tag.name, ctx.descriptor.template, ctx.descriptor.path
                ));
                out.push(line.to_string());
            }
        }
    }
    Ok(out)
}

/// Merge the info blocks of the mapped content files behind the first
/// content tag of each line, in line order. The first definition of a key
/// wins.
fn collect_info<S: AsRef<str>>(
    lines: &[S],
    ctx: &ContentContext<'_>,
    sources: &mut Sources,
) -> Result<BTreeMap<String, String>, NoSuchFile> {
    let mut info = BTreeMap::new();
    for line in lines {
        let Some(tag) = find_tag(line.as_ref(), TagKind::Content, 0) else {
            continue;
        };
        let Some(path) = ctx.descriptor.content.get(tag.name) else {
            continue;
        };
        for (key, value) in extract_info(sources.load(ctx.provider, path)?) {
            info.entry(key).or_insert(value);
        }
    }
    Ok(info)
}

fn substitute(
    name: &str,
    ctx: &ContentContext<'_>,
    info: &BTreeMap<String, String>,
    sources: &mut Sources,
) -> Result<Substitution, NoSuchFile> {
    if name == NOW_TAG {
        return Ok(Substitution::Lines(vec![ctx.now.to_string()]));
    }

    if let Some(path) = ctx.descriptor.content.get(name) {
        let body = strip_info(sources.load(ctx.provider, path)?);
        let lines = if ctx.markup.handles(path) {
            split_lines(&ctx.markup.convert(&body.concat()))
        } else {
            body.to_vec()
        };
        return Ok(Substitution::Lines(lines));
    }

    Ok(match info.get(name) {
        Some(value) => Substitution::Lines(vec![value.clone()]),
        None => Substitution::NoMapping,
    })
}
