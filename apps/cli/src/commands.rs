//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use serialbind_core::pipeline::{BuildConfig, BuildResult, ProgressReporter, build_epub};
use serialbind_shared::{load_manifest, sample_manifest};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Serialbind — bind web-serial chapters into an EPUB.
#[derive(Parser)]
#[command(
    name = "serialbind",
    version,
    about = "Download a web serial's chapter pages and bind them into a single EPUB file.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build an EPUB from a book manifest.
    Build {
        /// Path to the book manifest (TOML).
        manifest: PathBuf,

        /// Output directory for the .epub file (defaults to the current directory).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Cover image path, overriding the manifest's `cover` entry.
        #[arg(long)]
        cover: Option<PathBuf>,
    },

    /// Write a sample book manifest to get started.
    Init {
        /// Where to write the manifest.
        #[arg(default_value = "book.toml")]
        path: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "serialbind=info",
        1 => "serialbind=debug",
        _ => "serialbind=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            manifest,
            out,
            cover,
        } => cmd_build(&manifest, out.as_deref(), cover.as_deref()).await,
        Command::Init { path } => cmd_init(&path),
    }
}

async fn cmd_build(
    manifest_path: &Path,
    out: Option<&Path>,
    cover_override: Option<&Path>,
) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;

    // Cover: CLI flag wins, then the manifest entry (relative to the
    // manifest file), then none.
    let cover_path: Option<PathBuf> = match cover_override {
        Some(p) => Some(p.to_path_buf()),
        None => manifest.cover.as_ref().map(|rel| {
            manifest_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(rel)
        }),
    };

    let cover = match &cover_path {
        Some(p) => Some(
            std::fs::read(p).map_err(|e| eyre!("cannot read cover '{}': {e}", p.display()))?,
        ),
        None => None,
    };

    let config = BuildConfig {
        base_url: manifest.parsed_base_url()?,
        urls: manifest.parsed_urls()?,
        metadata: manifest.metadata(),
        cover,
    };

    info!(
        title = %config.metadata.title,
        documents = config.urls.len(),
        cover = cover_path.is_some(),
        "building EPUB"
    );

    let reporter = CliProgress::new();
    let result = build_epub(&config, &reporter).await?;

    let out_dir = out.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let out_path = out_dir.join(&result.filename);
    std::fs::write(&out_path, &result.data)
        .map_err(|e| eyre!("cannot write '{}': {e}", out_path.display()))?;

    // Print summary
    println!();
    println!("  EPUB created successfully!");
    println!("  Title:       {}", config.metadata.title);
    println!("  Parts:       {}", result.part_count);
    println!("  Chapters:    {}", result.chapter_count);
    println!("  Attachments: {}", result.attachment_count);
    println!("  Size:        {} bytes", result.data.len());
    println!("  Path:        {}", out_path.display());
    println!("  Time:        {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_init(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(eyre!("'{}' already exists, not overwriting", path.display()));
    }
    std::fs::write(path, sample_manifest())
        .map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
    println!("Sample manifest written to: {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn document_fetched(&self, url: &str, current: usize, total: usize) {
        let percent = (current * 100).div_ceil(total);
        self.spinner
            .set_message(format!("Downloading... ({percent}%) {url}"));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}
