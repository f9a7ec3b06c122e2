//! Template inclusion: `{/path}` pulls in a whole file.
//!
//! Inclusion is recursive and depth-first: the included file's own `{/...}`
//! tags are expanded before it is spliced into the including line. Only the
//! first inclusion tag on a line is expanded.
//!
//! ```text
//! page.tpl:    <p>{/nested.tpl}</p>
//! nested.tpl:  line
//!              {/notext.tpl}
//!              andmore
//! notext.tpl:  foo
//!              bar
//!
//! result:      <p>line
//!              foo
//!              bar
//!              andmore</p>
//! ```
//!
//! A file that (directly or through others) includes itself is reported as
//! [`IncludeError::CyclicInclude`] instead of recursing forever, and nesting
//! beyond the configured depth is [`IncludeError::IncludeTooDeep`].

use crate::provider::{FileProvider, NoSuchFile, normalize};
use crate::splice::splice;
use crate::tags::{TagKind, find_tag};
use thiserror::Error;

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Error, Debug)]
pub enum IncludeError {
    #[error(transparent)]
    NoSuchFile(#[from] NoSuchFile),
    #[error("Cyclic template inclusion: {}", chain.join(" -> "))]
    CyclicInclude { chain: Vec<String> },
    #[error("Template inclusion of {path} nests deeper than {limit} levels")]
    IncludeTooDeep { path: String, limit: usize },
}

/// Expand every inclusion tag in `lines`, with the default depth limit.
pub fn resolve_includes<S: AsRef<str>>(
    lines: &[S],
    provider: &dyn FileProvider,
) -> Result<Vec<String>, IncludeError> {
    resolve_includes_with_limit(lines, provider, DEFAULT_MAX_DEPTH)
}

/// Expand every inclusion tag in `lines`, allowing at most `max_depth`
/// levels of nested inclusion.
pub fn resolve_includes_with_limit<S: AsRef<str>>(
    lines: &[S],
    provider: &dyn FileProvider,
    max_depth: usize,
) -> Result<Vec<String>, IncludeError> {
    let mut chain = Vec::new();
    expand(lines, provider, max_depth, &mut chain)
}

/// `chain` holds the files currently being expanded, outermost first.
fn expand<S: AsRef<str>>(
    lines: &[S],
    provider: &dyn FileProvider,
    max_depth: usize,
    chain: &mut Vec<String>,
) -> Result<Vec<String>, IncludeError> {
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        let line = line.as_ref();
        let Some(tag) = find_tag(line, TagKind::Include, 0) else {
            out.push(line.to_string());
            continue;
        };

        let path = normalize(tag.name).to_string();
        if chain.contains(&path) {
            let mut cycle = chain.clone();
            cycle.push(path);
            return Err(IncludeError::CyclicInclude { chain: cycle });
        }
        if chain.len() >= max_depth {
            return Err(IncludeError::IncludeTooDeep {
                path,
                limit: max_depth,
            });
        }

        let included = provider.provide(&path)?;
        chain.push(path);
        let expanded = expand(&included, provider, max_depth, chain)?;
        chain.pop();

        out.extend(splice(tag.prefix(line), tag.suffix(line), &expanded));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;

    fn provider() -> MemoryProvider {
        [
            ("notext.tpl", "foo\nbar"),
            ("nested.tpl", "line\n{/notext.tpl}\nand more stuff\nandmore"),
            ("double-nested.tpl", "<p>{/nested.tpl}</p>"),
            ("error.tpl", "foo {/nosuch.tpl}"),
            ("indented.tpl", "<ul>\n    {/items.tpl}\n</ul>\n"),
            ("items.tpl", "<li>a</li>\n<li>b</li>\n"),
            ("self.tpl", "x\n{/self.tpl}\n"),
            ("ping.tpl", "{/pong.tpl}"),
            ("pong.tpl", "{/ping.tpl}"),
            ("empty.tpl", ""),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn lines_without_tags_pass_through() {
        let p = provider();
        let lines = p.provide("notext.tpl").unwrap();
        assert_eq!(resolve_includes(&lines, &p).unwrap(), lines);
    }

    #[test]
    fn standalone_tag_is_replaced_by_file() {
        let p = provider();
        let out = resolve_includes(&["{/notext.tpl}"], &p).unwrap();
        assert_eq!(out, vec!["foo\n", "bar"]);
    }

    #[test]
    fn nested_inclusion_flattens() {
        let p = provider();
        let lines = p.provide("nested.tpl").unwrap();
        let out = resolve_includes(&lines, &p).unwrap();
        assert_eq!(out, vec!["line\n", "foo\n", "bar\n", "and more stuff\n", "andmore"]);
    }

    #[test]
    fn double_nested_keeps_surrounding_text() {
        let p = provider();
        let lines = p.provide("double-nested.tpl").unwrap();
        let out = resolve_includes(&lines, &p).unwrap();
        assert_eq!(
            out,
            vec!["<p>line\n", "foo\n", "bar\n", "and more stuff\n", "andmore</p>"]
        );
    }

    #[test]
    fn included_lines_inherit_indentation() {
        let p = provider();
        let lines = p.provide("indented.tpl").unwrap();
        let out = resolve_includes(&lines, &p).unwrap();
        assert_eq!(
            out,
            vec!["<ul>\n", "    <li>a</li>\n", "    <li>b</li>\n", "</ul>\n"]
        );
    }

    #[test]
    fn leading_slash_resolves_from_root() {
        let p = provider();
        let out = resolve_includes(&["{//notext.tpl}"], &p).unwrap();
        assert_eq!(out, vec!["foo\n", "bar"]);
    }

    #[test]
    fn empty_include_drops_line() {
        let p = provider();
        let out = resolve_includes(&["a\n", "{/empty.tpl}\n", "b"], &p).unwrap();
        assert_eq!(out, vec!["a\n", "b"]);
    }

    #[test]
    fn missing_file_is_error() {
        let p = provider();
        let lines = p.provide("error.tpl").unwrap();
        let err = resolve_includes(&lines, &p).unwrap_err();
        match err {
            IncludeError::NoSuchFile(e) => assert_eq!(e.path, "nosuch.tpl"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_inclusion_is_cyclic() {
        let p = provider();
        let err = resolve_includes(&["{/self.tpl}"], &p).unwrap_err();
        match err {
            IncludeError::CyclicInclude { chain } => {
                assert_eq!(chain, vec!["self.tpl", "self.tpl"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mutual_inclusion_is_cyclic() {
        let p = provider();
        let err = resolve_includes(&["{/ping.tpl}"], &p).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cyclic template inclusion: ping.tpl -> pong.tpl -> ping.tpl"
        );
    }

    #[test]
    fn depth_limit() {
        let p = provider();
        let err = resolve_includes_with_limit(&["{/double-nested.tpl}"], &p, 2).unwrap_err();
        assert!(matches!(
            err,
            IncludeError::IncludeTooDeep { ref path, limit: 2 } if path == "notext.tpl"
        ));
        assert!(resolve_includes_with_limit(&["{/double-nested.tpl}"], &p, 3).is_ok());
    }

    #[test]
    fn same_file_included_twice_is_not_a_cycle() {
        let p = provider();
        let out = resolve_includes(&["{/notext.tpl}\n", "{/notext.tpl}"], &p).unwrap();
        assert_eq!(out, vec!["foo\n", "bar\n", "foo\n", "bar"]);
    }
}
