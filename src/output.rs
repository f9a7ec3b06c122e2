//! CLI output formatting.
//!
//! Output is **information-first**: every entry leads with its positional
//! index and output path, with the template and content sources shown as
//! indented context lines.
//!
//! ## Check
//!
//! ```text
//! 001 index.html (home)
//!     Template: templates/page.tpl
//!     body: content/home.md
//! 002 about/
//!     Template: templates/page.tpl
//!
//! 2 files in manifest
//! ```
//!
//! ## Render
//!
//! ```text
//! 001 index.html (home) → out/index.html
//! 002 about/ → out/about/index.html
//!
//! Rendered 2 files
//! ```
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::manifest::FileDescriptor;
use crate::render::RenderError;
use crate::site::BuildReport;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Entry header: positional index, output path, and name if any.
///
/// ```text
/// 001 index.html (home)
/// 002 about/
/// ```
fn entry_header(index: usize, path: &str, name: Option<&str>) -> String {
    let path = if path.is_empty() { "/" } else { path };
    match name {
        Some(n) => format!("{} {} ({})", format_index(index), path, n),
        None => format!("{} {}", format_index(index), path),
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the parsed manifest as an inventory.
pub fn format_manifest(files: &[FileDescriptor]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, file) in files.iter().enumerate() {
        lines.push(entry_header(i + 1, &file.path, file.name.as_deref()));
        lines.push(format!("{}Template: {}", indent(1), file.template));
        for (name, path) in &file.content {
            lines.push(format!("{}{}: {}", indent(1), name, path));
        }
    }
    lines.push(String::new());
    lines.push(format!("{} in manifest", plural(files.len(), "file")));
    lines
}

/// Format the failures of a check or render run.
pub fn format_failures(failures: &[&RenderError]) -> Vec<String> {
    if failures.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Failed".to_string()];
    for failure in failures {
        lines.push(format!("{}{}", indent(1), failure));
    }
    lines
}

/// Print the manifest inventory to stdout.
pub fn print_manifest(files: &[FileDescriptor]) {
    for line in format_manifest(files) {
        println!("{}", line);
    }
}

// ============================================================================
// Render
// ============================================================================

/// Format render output, one line per written file.
///
/// Output paths are shown relative to `output_root` when possible.
pub fn format_render_output(report: &BuildReport, output_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, file) in report.rendered.iter().enumerate() {
        let shown = file
            .output
            .strip_prefix(output_root)
            .map(|rel| {
                output_root
                    .file_name()
                    .map(|root| Path::new(root).join(rel))
                    .unwrap_or_else(|| rel.to_path_buf())
            })
            .unwrap_or_else(|_| file.output.clone());
        lines.push(format!(
            "{} \u{2192} {}",
            entry_header(i + 1, &file.path, file.name.as_deref()),
            shown.display()
        ));
    }

    let failures: Vec<&RenderError> = report.failures.iter().collect();
    lines.extend(format_failures(&failures));

    lines.push(String::new());
    let mut summary = format!("Rendered {}", plural(report.rendered.len(), "file"));
    if !report.failures.is_empty() {
        summary.push_str(&format!(", {} failed", report.failures.len()));
    }
    lines.push(summary);
    lines
}

/// Print render output to stdout.
pub fn print_render_output(report: &BuildReport, output_root: &Path) {
    for line in format_render_output(report, output_root) {
        println!("{}", line);
    }
}
