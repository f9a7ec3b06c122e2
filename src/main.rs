use clap::{Parser, Subcommand};
use grizz::diagnostics::LogReporter;
use grizz::{config, output, site};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grizz")]
#[command(about = "Manifest-driven static site generator")]
#[command(long_about = "\
Manifest-driven static site generator

A manifest lists every output file, the template it is built from, and the
content files that fill it. Entries are separated by blank lines:

  index.html: (home)           # output path, optional (name)
      templates/page.tpl       # template
      body: content/home.md    # content tag name: content file

  about/                       # trailing / writes about/index.html
      templates/page.tpl
      body: content/about.md

Template tags:
  {/path}    include another template, indented like the tag
  {name}     content file, or a `name: value` line from a content file header
  {_now}     render timestamp (seconds since the Unix epoch)
  {@name}    site path of the manifest entry called name

Paths are relative to the manifest's directory. Run 'grizz gen-config' to
generate a documented grizz.toml.")]
#[command(version)]
struct Cli {
    /// Log progress and debug detail
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every manifest entry and write the site
    Render {
        /// Manifest file
        manifest: PathBuf,
        /// Output directory (overrides output_dir from grizz.toml)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Keep rendering after an entry fails
        #[arg(long)]
        keep_going: bool,
    },
    /// Parse the manifest and render everything without writing
    Check {
        /// Manifest file
        manifest: PathBuf,
        /// Print the parsed manifest as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock grizz.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Render {
            manifest,
            output: output_dir,
            keep_going,
        } => {
            let dir = site::manifest_dir(&manifest);
            let config = config::load_config(&dir)?;
            init_thread_pool(&config.processing);

            let mut options = site::BuildOptions::from_config(&config, &dir);
            if let Some(output_dir) = output_dir {
                options.output_root = output_dir;
            }
            options.keep_going |= keep_going;

            println!("==> Rendering {}", manifest.display());
            let session = site::session_for(&config);
            let mut reporter = LogReporter::new();
            let report = site::build(&manifest, &session, &options, &mut reporter)?;
            output::print_render_output(&report, &options.output_root);

            if !report.is_success() {
                return Err(format!("{} entries failed to render", report.failures.len()).into());
            }
        }
        Command::Check { manifest, json } => {
            let dir = site::manifest_dir(&manifest);
            let config = config::load_config(&dir)?;
            init_thread_pool(&config.processing);

            let session = site::session_for(&config);
            let mut reporter = LogReporter::new();
            let report = site::check(&manifest, &session, &mut reporter)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report.files)?);
            } else {
                println!("==> Checking {}", manifest.display());
                output::print_manifest(&report.files);
                let failures: Vec<_> = report.failures.iter().collect();
                for line in output::format_failures(&failures) {
                    println!("{}", line);
                }
            }

            if !report.is_success() {
                return Err(format!("{} entries failed to render", report.failures.len()).into());
            }
            if !json {
                println!("==> Manifest is valid ({} warnings)", reporter.count());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
