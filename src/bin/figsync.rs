//! CLI binary for figsync.
//!
//! A thin shim over the library crate that maps subcommands and flags to
//! `PipelineConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use figsync::{
    convert_all, convert_pdf_to_png, convert_svg_to_pdf, list_figures,
    sync_to_external_directory, ConfigFile, Dialect, FigureListing, InkscapeRenderer,
    PipelineConfig, PipelineOutput, PipelineProgressCallback, ProgressCallback, Stage, Target,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Config file picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "figsync.toml";

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar per stage, one log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage, figure_id: &str, files: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:32.green/238}] {pos:>3}/{len} files  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_style(style);
        self.bar.set_length(files as u64);
        self.bar.set_position(0);
        self.bar.set_prefix(format!("fig {figure_id} {stage}"));
        self.bar.set_message("");
    }

    fn on_file_complete(&self, stage: Stage, figure_id: &str, output: &Path) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            dim(&format!("fig {figure_id} {stage:<8}")),
            file_name(output)
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, stage: Stage, figure_id: &str, input: &Path, error: &str) {
        let first_line = error.lines().next().unwrap_or(error);
        self.bar.println(format!(
            "  {} {}  {}  {}",
            red("✗"),
            dim(&format!("fig {figure_id} {stage:<8}")),
            file_name(input),
            red(first_line)
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Export every registered figure's SVGs to PDF
  figsync convert-svg-to-pdf

  # Rasterise figure 2's PDFs to PNG (250 DPI, white background)
  figsync convert-pdf-to-png --fig=2

  # Both steps for one figure
  figsync convert-png-pdf --fig=1

  # Both steps, then copy PDFs and PNGs into <target-dir>/figs/
  figsync --target-dir ~/overleaf_example sync-overleaf --fig=1

  # Show the registry
  figsync list-figures

CONFIG FILE (figsync.toml in the working directory, or --config):
  base_dir = "/home/me/figure_tutorial"
  target_dir = "/home/me/overleaf_example"
  legacy_inkscape = false   # true for Inkscape 0.92
  dpi = 250
  background = "white"

  [[figures]]
  id = "1"
  path = "paper/fig1"

ENVIRONMENT VARIABLES:
  FIGSYNC_CONFIG           Config file path
  FIGSYNC_BASE_DIR         Root that figure paths are relative to
  FIGSYNC_TARGET_DIR       Document directory for sync-overleaf
  FIGSYNC_INKSCAPE         Inkscape executable
  FIGSYNC_LEGACY_INKSCAPE  Use Inkscape 0.92 flags
  RUST_LOG                 Override log filter (e.g. figsync=debug)
"#;

/// Convert SVG figures to PDF/PNG with Inkscape and sync them into a paper.
#[derive(Parser, Debug)]
#[command(
    name = "figsync",
    version,
    about = "Convert SVG figures to PDF/PNG with Inkscape and sync them into a paper",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML config file.
    #[arg(long, global = true, env = "FIGSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Root directory that figure paths are relative to.
    #[arg(long, global = true, env = "FIGSYNC_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Document directory; sync copies into its figs/ subdirectory.
    #[arg(long, global = true, env = "FIGSYNC_TARGET_DIR")]
    target_dir: Option<PathBuf>,

    /// Inkscape executable.
    #[arg(long, global = true, env = "FIGSYNC_INKSCAPE")]
    inkscape: Option<PathBuf>,

    /// Use Inkscape 0.92 command-line flags.
    #[arg(long, global = true, env = "FIGSYNC_LEGACY_INKSCAPE")]
    legacy_inkscape: bool,

    /// PNG export resolution.
    #[arg(long, global = true, env = "FIGSYNC_DPI",
          value_parser = clap::value_parser!(u32).range(1..=2400))]
    dpi: Option<u32>,

    /// PNG background colour.
    #[arg(long, global = true, env = "FIGSYNC_BACKGROUND")]
    background: Option<String>,

    /// Print the run report as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "FIGSYNC_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "FIGSYNC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "FIGSYNC_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export SVG sources to PDF (every figure when --fig is omitted).
    ConvertSvgToPdf(OptionalFig),
    /// Rasterise PDFs to PNG (every figure when --fig is omitted).
    ConvertPdfToPng(OptionalFig),
    /// SVG → PDF → PNG for one figure.
    ConvertPngPdf(RequiredFig),
    /// Convert one figure, then copy its PDFs and PNGs into <target-dir>/figs/.
    SyncOverleaf(RequiredFig),
    /// List registered figures.
    ListFigures,
}

#[derive(Args, Debug)]
struct OptionalFig {
    /// Figure id from the registry.
    #[arg(long)]
    fig: Option<String>,
}

#[derive(Args, Debug)]
struct RequiredFig {
    /// Figure id from the registry.
    #[arg(long)]
    fig: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless --verbose is given.
    let show_progress = !cli.quiet
        && !cli.no_progress
        && !cli.json
        && !matches!(cli.command, Command::ListFigures);
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let config = build_config(
        &cli,
        progress.clone().map(|p| p as ProgressCallback),
    )?;
    let renderer = InkscapeRenderer::from_config(&config);

    // ── Run ──────────────────────────────────────────────────────────────
    let result = match &cli.command {
        Command::ListFigures => {
            print_listing(&list_figures(&config), cli.json)?;
            return Ok(());
        }
        Command::ConvertSvgToPdf(args) => {
            convert_svg_to_pdf(&config, &renderer, &Target::from(args.fig.clone()))
                .await
                .context("SVG → PDF conversion failed")
        }
        Command::ConvertPdfToPng(args) => {
            convert_pdf_to_png(&config, &renderer, &Target::from(args.fig.clone()))
                .await
                .context("PDF → PNG conversion failed")
        }
        Command::ConvertPngPdf(args) => convert_all(&config, &renderer, &args.fig)
            .await
            .with_context(|| format!("Conversion of figure '{}' failed", args.fig)),
        Command::SyncOverleaf(args) => sync_to_external_directory(&config, &renderer, &args.fig)
            .await
            .with_context(|| format!("Sync of figure '{}' failed", args.fig)),
    };

    if let Some(ref p) = progress {
        p.finish();
    }
    let output = result?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize report")?
        );
    } else if !cli.quiet {
        print_summary(&output);
    }

    Ok(())
}

/// Layer defaults, config file, then env vars / flags.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder();

    let config_path = cli.config.clone().or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        default.is_file().then_some(default)
    });
    if let Some(path) = config_path {
        let file = ConfigFile::load(&path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?;
        builder = builder.config_file(file);
    }

    if let Some(ref dir) = cli.base_dir {
        builder = builder.base_dir(dir);
    }
    if let Some(ref dir) = cli.target_dir {
        builder = builder.target_dir(dir);
    }
    if let Some(ref bin) = cli.inkscape {
        builder = builder.inkscape_bin(bin);
    }
    if cli.legacy_inkscape {
        builder = builder.dialect(Dialect::Legacy);
    }
    if let Some(dpi) = cli.dpi {
        builder = builder.dpi(dpi);
    }
    if let Some(ref bg) = cli.background {
        builder = builder.background(bg);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_listing(figures: &[FigureListing], json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(figures).context("Failed to serialize figure list")?
        );
        return Ok(());
    }
    for f in figures {
        println!("{}", listing_row(f));
    }
    Ok(())
}

/// One `list-figures` line. Columns are padded before colouring so the
/// escape codes do not count toward the width.
fn listing_row(f: &FigureListing) -> String {
    let status = if f.exists {
        green("ok")
    } else {
        red("missing")
    };
    let path = f.path.display().to_string();
    format!(
        "{} {path:<24}  {}  {}",
        bold(&format!("{:<6}", f.id)),
        dim(&f.dir.display().to_string()),
        status
    )
}

fn print_summary(output: &PipelineOutput) {
    let s = &output.stats;
    let mut parts = Vec::new();
    if s.pdfs_written > 0 {
        parts.push(format!("{} pdf", s.pdfs_written));
    }
    if s.pngs_written > 0 {
        parts.push(format!("{} png", s.pngs_written));
    }
    if s.files_copied > 0 {
        parts.push(format!("{} copied", s.files_copied));
    }
    if parts.is_empty() {
        parts.push("nothing to do".into());
    }
    eprintln!(
        "{} {} figure(s): {}  {}",
        green("✔"),
        bold(&s.figures.to_string()),
        parts.join(", "),
        dim(&format!("{:.1}s", s.duration_ms as f64 / 1000.0))
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, path: &str, exists: bool) -> FigureListing {
        FigureListing {
            id: id.into(),
            path: PathBuf::from(path),
            dir: PathBuf::from(path).join("fig"),
            exists,
        }
    }

    /// Strip `ESC [ … m` sequences so the visible layout can be measured.
    fn visible(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn listing_columns_line_up_despite_colour_codes() {
        let rows = [
            listing("1", "paper/fig1", true),
            listing("intro", "paper/introduction", false),
        ];
        let dir_columns: Vec<usize> = rows
            .iter()
            .map(|f| {
                let line = visible(&listing_row(f));
                line.find(&f.dir.display().to_string()).unwrap()
            })
            .collect();
        assert_eq!(dir_columns[0], dir_columns[1]);

        let first = visible(&listing_row(&rows[0]));
        assert!(first.starts_with("1      paper/fig1"), "got: {first:?}");
        assert!(first.ends_with("ok"));
        assert!(visible(&listing_row(&rows[1])).ends_with("missing"));
    }
}
