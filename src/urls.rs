//! Cross-file links: `{@name}` becomes the site path of the manifest entry
//! named `name`.
//!
//! Every `{@name}` on a line is resolved. The replacement is the target's
//! output path rooted at `/`, so `index.html: (home)` makes `{@home}` render
//! as `/index.html`. Unknown names are warned about and left as written.

use crate::diagnostics::Reporter;
use crate::manifest::FileDescriptor;
use crate::tags::{TagKind, tags};

/// Site-absolute URL of a descriptor's output.
pub fn url_for(descriptor: &FileDescriptor) -> String {
    format!("/{}", descriptor.path.trim_start_matches('/'))
}

/// First descriptor carrying `name`.
pub fn find_named<'a>(files: &'a [FileDescriptor], name: &str) -> Option<&'a FileDescriptor> {
    files.iter().find(|f| f.name.as_deref() == Some(name))
}

/// Resolve URL references in `lines` against the full descriptor list.
pub fn resolve_urls<S: AsRef<str>>(
    lines: &[S],
    descriptor: &FileDescriptor,
    files: &[FileDescriptor],
    reporter: &mut dyn Reporter,
) -> Vec<String> {
    lines
        .iter()
        .map(|line| resolve_line(line.as_ref(), descriptor, files, reporter))
        .collect()
}

fn resolve_line(
    line: &str,
    descriptor: &FileDescriptor,
    files: &[FileDescriptor],
    reporter: &mut dyn Reporter,
) -> String {
    let mut out = String::with_capacity(line.len());
    let mut copied = 0;
    for tag in tags(line, TagKind::Url) {
        match find_named(files, tag.name) {
            Some(target) => {
                out.push_str(&line[copied..tag.start]);
                out.push_str(&url_for(target));
                copied = tag.end;
            }
            None => reporter.report(&format!(
                "warning: found URL reference {{@{}}} in /{}, but no file is named {}",
                tag.name, descriptor.path, tag.name
            )),
        }
    }
    out.push_str(&line[copied..]);
    out
}
