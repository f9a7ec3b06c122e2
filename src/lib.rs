//! # grizz
//!
//! A manifest-driven static site generator. A plain-text manifest lists every
//! output file with the template it is built from and the content files that
//! fill it. Templates are ordinary text with three kinds of tags.
//!
//! # Architecture: One Pass Per Tag Kind
//!
//! Each manifest entry is rendered by running its template through three
//! independent passes, each a function from lines to lines:
//!
//! ```text
//! template ──▶ includes ──▶ content ──▶ urls ──▶ out/<path>
//!              {/path}      {name}       {@name}
//! ```
//!
//! - **Includes** splice other templates in place, recursively.
//! - **Content** fills `{name}` from the entry's content files, or from the
//!   `key: value` info header at the top of those files. `{_now}` is the
//!   render timestamp.
//! - **URLs** turn `{@name}` into the site path of the entry named `name`.
//!
//! Every pass reads files through a [`provider::FileProvider`] and reports
//! warnings through a [`diagnostics::Reporter`], so the whole pipeline runs
//! against in-memory fixtures in tests.
//!
//! # Manifest Format
//!
//! ```text
//! index.html: (home)
//!     templates/page.tpl
//!     body: content/home.md
//!
//! about/
//!     templates/page.tpl
//!     body: content/about.md
//! ```
//!
//! Entries are separated by blank lines. The first line is the output path
//! with an optional `(name)`, the second the template, the rest content
//! mappings.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manifest`] | Parses the manifest into [`manifest::FileDescriptor`]s |
//! | [`tags`] | Finds `{/path}`, `{name}` and `{@name}` tags in a line |
//! | [`splice`] | Replaces a tag with multi-line text, keeping indentation |
//! | [`include`] | Recursive `{/path}` expansion with cycle and depth guards |
//! | [`info`] | `key: value` info headers of content files |
//! | [`content`] | `{name}` substitution from content files and info |
//! | [`urls`] | `{@name}` cross-file links |
//! | [`render`] | Renders one entry; [`render::RenderSession`] holds per-run settings |
//! | [`provider`] | File access: directory-backed and in-memory providers |
//! | [`diagnostics`] | Warning sinks: collecting and `tracing`-backed |
//! | [`markup`] | Markdown conversion for content files, by extension |
//! | [`site`] | Batch rendering of a whole manifest and writing the results |
//! | [`config`] | `grizz.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Line-Oriented Splicing
//!
//! Templates are handled as lines that keep their newline. When a tag is
//! replaced by several lines, the text before the tag becomes the indentation
//! of every inserted line, so included HTML lines up with its surroundings
//! without any template syntax for it.
//!
//! ## Missing Files Are Fatal, Everything Else Warns
//!
//! A missing template, include or content file stops that entry: a page with
//! a hole in it is worse than no page. An unknown `{name}` or `{@name}` is left
//! as written and reported, since it may well be literal text.
//!
//! ## Parallel Render, Sequential Story
//!
//! Entries render in parallel on the rayon pool, each into its own diagnostics
//! buffer. Buffers are replayed in manifest order, so the warnings and the
//! first failure read exactly as they would in a sequential run.

pub mod config;
pub mod content;
pub mod diagnostics;
pub mod include;
pub mod info;
pub mod manifest;
pub mod markup;
pub mod output;
pub mod provider;
pub mod render;
pub mod site;
pub mod splice;
pub mod tags;
pub mod urls;
