//! Batch rendering of a whole manifest and writing the results.
//!
//! ```text
//! manifest ──parse──▶ descriptors ──render (parallel)──▶ replay in order ──▶ out/
//! ```
//!
//! Templates and content are read relative to the manifest's directory.
//! Entries are rendered in parallel with rayon, each into its own diagnostics
//! buffer. Buffers are then replayed in manifest order, so warnings read the
//! same as a sequential run and "stop at the first failure" means the first
//! failure in the manifest.
//!
//! ## Output paths
//!
//! ```text
//! index.html     → out/index.html
//! blog/post.html → out/blog/post.html
//! about/         → out/about/index.html
//! ```

use crate::config::{self, SiteConfig};
use crate::diagnostics::{Reporter, replay};
use crate::manifest::{self, FileDescriptor};
use crate::markup::Markdown;
use crate::provider::{DirProvider, FileProvider};
use crate::render::{RenderError, RenderSession};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Manifest error: {0}")]
    Manifest(#[from] manifest::ManifestError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// How a batch run behaves.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Where output files are written.
    pub output_root: PathBuf,
    /// File name for entries whose path ends in `/`.
    pub index_file: String,
    /// Continue past entries that fail to render.
    pub keep_going: bool,
}

impl BuildOptions {
    /// Options from config, with the output root resolved against the
    /// manifest's directory.
    pub fn from_config(config: &SiteConfig, manifest_dir: &Path) -> Self {
        Self {
            output_root: manifest_dir.join(&config.output_dir),
            index_file: config.index_file.clone(),
            keep_going: config.render.keep_going,
        }
    }
}

/// One output file.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub path: String,
    pub name: Option<String>,
    pub output: PathBuf,
}

/// Outcome of a batch run that wasn't aborted.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub rendered: Vec<RenderedFile>,
    pub failures: Vec<RenderError>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The directory templates and content are read from.
pub fn manifest_dir(manifest_path: &Path) -> PathBuf {
    manifest_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Session configured from `config`.
pub fn session_for(config: &SiteConfig) -> RenderSession {
    RenderSession::new(Box::new(Markdown::new(&config.markup.extensions)))
        .with_max_include_depth(config.render.max_include_depth)
}

/// Where the output for `path` goes under `root`.
pub fn output_path(root: &Path, path: &str, index_file: &str) -> PathBuf {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() || relative.ends_with('/') {
        root.join(relative).join(index_file)
    } else {
        root.join(relative)
    }
}

/// Write rendered lines, creating parent directories as needed.
pub fn write_output(output: &Path, lines: &[String]) -> std::io::Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, lines.concat())
}

/// Render result plus the diagnostics produced while rendering it.
pub struct Rendered {
    pub result: Result<Vec<String>, RenderError>,
    pub diagnostics: Vec<String>,
}

/// Render every descriptor in parallel. Results are in manifest order.
pub fn render_all(
    files: &[FileDescriptor],
    provider: &dyn FileProvider,
    session: &RenderSession,
) -> Vec<Rendered> {
    files
        .par_iter()
        .map(|file| {
            tracing::debug!(path = %file.path, template = %file.template, "rendering");
            let mut diagnostics: Vec<String> = Vec::new();
            let result = session.render(file, files, provider, &mut diagnostics);
            Rendered {
                result,
                diagnostics,
            }
        })
        .collect()
}

/// Render and write every descriptor.
///
/// Without `keep_going`, the first failing entry (in manifest order) aborts
/// the run with [`SiteError::Render`]; entries before it are still written.
/// With `keep_going`, failures are collected in the report.
pub fn build_files(
    files: &[FileDescriptor],
    provider: &dyn FileProvider,
    session: &RenderSession,
    options: &BuildOptions,
    reporter: &mut dyn Reporter,
) -> Result<BuildReport, SiteError> {
    let mut report = BuildReport::default();

    for (file, rendered) in files.iter().zip(render_all(files, provider, session)) {
        replay(&rendered.diagnostics, reporter);
        match rendered.result {
            Ok(lines) => {
                let output = output_path(&options.output_root, &file.path, &options.index_file);
                write_output(&output, &lines)?;
                tracing::info!(
                    path = %file.path,
                    output = %output.display(),
                    lines = lines.len(),
                    "wrote"
                );
                report.rendered.push(RenderedFile {
                    path: file.path.clone(),
                    name: file.name.clone(),
                    output,
                });
            }
            Err(e) if options.keep_going => report.failures.push(e),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(report)
}

/// Outcome of rendering a manifest without writing anything.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub files: Vec<FileDescriptor>,
    pub failures: Vec<RenderError>,
}

impl CheckReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Render every descriptor in memory and collect the failures.
pub fn check_files(
    files: &[FileDescriptor],
    provider: &dyn FileProvider,
    session: &RenderSession,
    reporter: &mut dyn Reporter,
) -> Vec<RenderError> {
    let mut failures = Vec::new();
    for rendered in render_all(files, provider, session) {
        replay(&rendered.diagnostics, reporter);
        if let Err(e) = rendered.result {
            failures.push(e);
        }
    }
    failures
}

/// Load the manifest at `manifest_path` and render it without writing.
pub fn check(
    manifest_path: &Path,
    session: &RenderSession,
    reporter: &mut dyn Reporter,
) -> Result<CheckReport, SiteError> {
    let files = manifest::load_manifest(manifest_path)?;
    let provider = DirProvider::new(manifest_dir(manifest_path));
    let failures = check_files(&files, &provider, session, reporter);
    Ok(CheckReport { files, failures })
}

/// Load the manifest at `manifest_path` and build it with `options`.
pub fn build(
    manifest_path: &Path,
    session: &RenderSession,
    options: &BuildOptions,
    reporter: &mut dyn Reporter,
) -> Result<BuildReport, SiteError> {
    let files = manifest::load_manifest(manifest_path)?;
    let provider = DirProvider::new(manifest_dir(manifest_path));
    build_files(&files, &provider, session, options, reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::NoMarkup;
    use crate::provider::MemoryProvider;
    use tempfile::TempDir;

    #[test]
    fn output_path_for_file() {
        let root = Path::new("/site/out");
        assert_eq!(
            output_path(root, "blog/post.html", "index.html"),
            PathBuf::from("/site/out/blog/post.html")
        );
    }

    #[test]
    fn output_path_for_directory_uses_index_file() {
        let root = Path::new("/site/out");
        assert_eq!(
            output_path(root, "about/", "index.html"),
            PathBuf::from("/site/out/about/index.html")
        );
        assert_eq!(
            output_path(root, "", "default.htm"),
            PathBuf::from("/site/out/default.htm")
        );
        assert_eq!(
            output_path(root, "/", "index.html"),
            PathBuf::from("/site/out/index.html")
        );
    }

    #[test]
    fn manifest_dir_of_bare_filename_is_cwd() {
        assert_eq!(manifest_dir(Path::new("manifest")), PathBuf::from("."));
        assert_eq!(manifest_dir(Path::new("site/manifest")), PathBuf::from("site"));
    }

    #[test]
    fn options_from_config() {
        let mut config = SiteConfig::default();
        config.render.keep_going = true;
        let options = BuildOptions::from_config(&config, Path::new("/site"));
        assert_eq!(options.output_root, PathBuf::from("/site/out"));
        assert_eq!(options.index_file, "index.html");
        assert!(options.keep_going);
    }

    fn fixtures() -> (MemoryProvider, Vec<FileDescriptor>) {
        let provider: MemoryProvider = [
            ("t.tpl", "<h1>{title}</h1>\n{body}\n<a href=\"{@home}\">{missing}</a>\n"),
            ("a.txt", "title: A\n\nalpha\n"),
            ("b.txt", "title: B\n\nbeta\n"),
        ]
        .into_iter()
        .collect();
        let files = vec![
            FileDescriptor::new("index.html", "t.tpl")
                .named("home")
                .with_content("body", "a.txt"),
            FileDescriptor::new("broken/", "t.tpl").with_content("body", "nope.txt"),
            FileDescriptor::new("b/", "t.tpl").with_content("body", "b.txt"),
        ];
        (provider, files)
    }

    #[test]
    fn render_all_keeps_manifest_order() {
        let (provider, files) = fixtures();
        let session = RenderSession::new(Box::new(NoMarkup));
        let rendered = render_all(&files, &provider, &session);
        assert_eq!(rendered.len(), 3);
        assert_eq!(rendered[0].result.as_ref().unwrap()[0], "<h1>A</h1>\n");
        assert!(rendered[1].result.is_err());
        assert_eq!(rendered[2].result.as_ref().unwrap()[0], "<h1>B</h1>\n");
        // {missing} on every successful page
        assert_eq!(rendered[0].diagnostics.len(), 1);
    }

    #[test]
    fn build_files_stops_at_first_failure() {
        let (provider, files) = fixtures();
        let tmp = TempDir::new().unwrap();
        let options = BuildOptions {
            output_root: tmp.path().to_path_buf(),
            index_file: "index.html".into(),
            keep_going: false,
        };
        let mut warnings: Vec<String> = Vec::new();
        let err = build_files(
            &files,
            &provider,
            &RenderSession::new(Box::new(NoMarkup)),
            &options,
            &mut warnings,
        )
        .unwrap_err();

        assert!(matches!(err, SiteError::Render(ref e) if e.path() == "broken/"));
        assert!(tmp.path().join("index.html").exists());
        assert!(!tmp.path().join("b/index.html").exists());
        // index.html's {missing} warning, then broken/'s error
        assert_eq!(warnings.len(), 2);
        assert!(warnings[1].starts_with("error: /broken/"));
    }

    #[test]
    fn build_files_keep_going_collects_failures() {
        let (provider, files) = fixtures();
        let tmp = TempDir::new().unwrap();
        let options = BuildOptions {
            output_root: tmp.path().to_path_buf(),
            index_file: "index.html".into(),
            keep_going: true,
        };
        let mut warnings: Vec<String> = Vec::new();
        let report = build_files(
            &files,
            &provider,
            &RenderSession::new(Box::new(NoMarkup)),
            &options,
            &mut warnings,
        )
        .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.rendered.len(), 2);
        assert_eq!(report.rendered[1].output, tmp.path().join("b/index.html"));
        let b = fs::read_to_string(tmp.path().join("b/index.html")).unwrap();
        assert_eq!(b, "<h1>B</h1>\nbeta\n<a href=\"/index.html\">{missing}</a>\n");
    }

    #[test]
    fn check_files_writes_nothing_and_reports_every_failure() {
        let (provider, files) = fixtures();
        let mut warnings: Vec<String> = Vec::new();
        let failures = check_files(
            &files,
            &provider,
            &RenderSession::new(Box::new(NoMarkup)),
            &mut warnings,
        );
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path(), "broken/");
        // two {missing} warnings plus one error line
        assert_eq!(warnings.len(), 3);
    }
}
