//! CLI binary for pdf2md-text.
//!
//! A thin shim over the library crate that maps CLI arguments to
//! `ConversionConfig`, picks single-file or batch mode, and prints results.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use pdf2md_text::pipeline::input::validate_input;
use pdf2md_text::{
    convert_batch, convert_to_file, inspect, BatchReport, ConversionConfig,
    ConversionProgressCallback, FileOutcome, ProgressCallback, DEFAULT_OUTPUT_DIR,
    DEFAULT_SOURCE_DIR,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar, reused for every document of a run.
struct CliProgressCallback {
    bar: ProgressBar,
    page_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// The bar stays hidden until the first document starts, so runs that
    /// convert nothing print nothing.
    fn new() -> Arc<Self> {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  {msg:.dim}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.reset();
        self.bar.set_length(total as u64);
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut started) = self.page_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, lines: usize) {
        let elapsed_ms = self
            .page_started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{lines:>4} lines")),
            dim(&format!("{elapsed_ms}ms")),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, _total_pages: usize) {
        self.bar.finish_and_clear();
    }
}

impl Drop for CliProgressCallback {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

const AFTER_HELP: &str = r#"MODES:
  pdf2md                        Convert every PDF in the source directory
  pdf2md <file.pdf>             Convert one PDF into the output directory
  pdf2md <file.pdf> <out_dir>   Convert one PDF into <out_dir>
  pdf2md help                   Show this help

OUTPUT LAYOUT:
  <out_dir>/<name>/<name>.md    one Markdown file per PDF, with YAML frontmatter

EXAMPLES:
  # Batch: convert ./source/*.pdf into ./output/
  pdf2md

  # Batch with other directories
  pdf2md --source-dir inbox --output-dir converted

  # Single file
  pdf2md report.pdf
  pdf2md report.pdf ~/notes

  # Inspect PDF metadata only
  pdf2md --inspect-only report.pdf

  # Machine-readable report
  pdf2md --json report.pdf > report.json

ENVIRONMENT VARIABLES:
  PDF2MD_SOURCE_DIR   Default for --source-dir
  PDF2MD_OUTPUT_DIR   Default for --output-dir
  PDFIUM_LIB_PATH     Path to libpdfium (file or directory)
  RUST_LOG            Override log filtering (e.g. RUST_LOG=pdf2md_text=debug)

NOTES:
  Scanned PDFs (no text layer) are detected and reported; OCR is not performed.
"#;

/// Convert text-layer PDF files to structured Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2md",
    version,
    about = "Convert text-layer PDF files to structured Markdown",
    long_about = "Convert PDF documents to Markdown using their embedded text layer. \
Font sizes become headings, ruled tables become Markdown tables, and images are noted \
with a marker. Each document gets YAML frontmatter with its metadata.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert. Omit to convert every PDF in --source-dir.
    input: Option<String>,

    /// Output directory for single-file mode. Defaults to --output-dir.
    output: Option<PathBuf>,

    /// Directory scanned for PDFs in batch mode.
    #[arg(long, env = "PDF2MD_SOURCE_DIR", default_value = DEFAULT_SOURCE_DIR)]
    source_dir: PathBuf,

    /// Root directory for converted Markdown.
    #[arg(long, env = "PDF2MD_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2MD_PASSWORD")]
    password: Option<String>,

    /// Skip table detection.
    #[arg(long, env = "PDF2MD_NO_TABLES")]
    no_tables: bool,

    /// Print a JSON report on stdout.
    #[arg(long, env = "PDF2MD_JSON")]
    json: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2MD_QUIET")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", red("Error:"), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.input.as_deref() == Some("help") {
        Cli::command()
            .print_long_help()
            .context("Failed to print help")?;
        return Ok(ExitCode::SUCCESS);
    }

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar and the summary lines carry what matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.input.clone() {
        Some(input) => run_single(&cli, Path::new(&input), show_progress),
        None => run_batch(&cli, show_progress),
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder().detect_tables(!cli.no_tables);
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

fn progress_callback(show: bool) -> Option<ProgressCallback> {
    show.then(|| CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
}

// ── Single-file mode ─────────────────────────────────────────────────────────

fn run_single(cli: &Cli, input: &Path, show_progress: bool) -> Result<ExitCode> {
    validate_input(input).context("Invalid input")?;

    if cli.inspect_only {
        let meta = inspect(input, cli.password.as_deref()).context("Failed to inspect PDF")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", input.display());
            println!("Title:        {}", meta.title);
            println!("Author:       {}", meta.author);
            println!("Pages:        {}", meta.pages);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let output_root = cli.output.as_deref().unwrap_or(&cli.output_dir);
    let config = build_config(cli, progress_callback(show_progress))?;

    if !cli.quiet && !cli.json {
        eprintln!("{} {}", cyan("◆"), bold(&format!("Converting {}", input.display())));
    }
    let report = convert_to_file(input, output_root, &config).context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        let stats = &report.stats;
        if stats.likely_scanned {
            eprintln!(
                "{} This appears to be a scanned PDF. OCR would be needed for better results.",
                yellow("⚠")
            );
        }
        eprintln!(
            "{}  {} pages  {} tables  {} images  {}ms  →  {}",
            green("✔"),
            stats.total_pages,
            stats.tables,
            stats.images,
            stats.total_duration_ms,
            bold(&report.output_path.display().to_string()),
        );
    }
    Ok(ExitCode::SUCCESS)
}

// ── Batch mode ───────────────────────────────────────────────────────────────

fn run_batch(cli: &Cli, show_progress: bool) -> Result<ExitCode> {
    if cli.inspect_only {
        anyhow::bail!("--inspect-only needs a PDF file argument");
    }
    let config = build_config(cli, progress_callback(show_progress))?;
    let report = convert_batch(&cli.source_dir, &cli.output_dir, &config)
        .with_context(|| format!("Batch conversion of '{}' failed", cli.source_dir.display()))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        print_batch_summary(&report);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_batch_summary(report: &BatchReport) {
    if report.created_source_dir {
        eprintln!(
            "{} Created source directory '{}'. Place your PDF files there and run again.",
            cyan("◆"),
            report.source_dir.display()
        );
        return;
    }
    if report.outcomes.is_empty() {
        eprintln!(
            "{} No PDF files found in '{}'.",
            yellow("⚠"),
            report.source_dir.display()
        );
        return;
    }

    for outcome in &report.outcomes {
        match outcome {
            FileOutcome::Converted { file_name, report } => {
                let scanned = if report.stats.likely_scanned {
                    yellow("  (likely scanned)")
                } else {
                    String::new()
                };
                eprintln!(
                    "  {} {:<32} {}{}",
                    green("✓"),
                    file_name,
                    dim(&format!(
                        "{} pages, {} tables, {} images",
                        report.stats.total_pages, report.stats.tables, report.stats.images
                    )),
                    scanned
                );
            }
            FileOutcome::Failed { file_name, error } => {
                eprintln!("  {} {:<32} {}", red("✗"), file_name, red(error));
            }
        }
    }

    let failed = report.failed();
    eprintln!(
        "{} {} succeeded, {} failed  ({} tables, {} images)  →  {}",
        if failed == 0 { green("✔") } else { yellow("⚠") },
        bold(&report.succeeded().to_string()),
        if failed == 0 {
            failed.to_string()
        } else {
            red(&failed.to_string())
        },
        report.total_tables(),
        report.total_images(),
        bold(&report.output_dir.display().to_string()),
    );
}
