//! # figsync
//!
//! Convert SVG figures to PDF and PNG with Inkscape, then copy the results
//! into a paper's figure directory.
//!
//! Each figure is a directory of SVG sources. figsync exports every SVG to a
//! PDF next to it, rasterises every PDF to a PNG (250 DPI, white background),
//! and on request copies the PDFs and PNGs into `<target_dir>/figs/` of a
//! separate document checkout such as an Overleaf project.
//!
//! ## Pipeline Overview
//!
//! ```text
//! <base_dir>/<figure path>/fig/*.svg
//!  │
//!  ├─ 1. Resolve  registry lookup + directory checks (no writes yet)
//!  ├─ 2. Export   inkscape: *.svg → *.pdf
//!  ├─ 3. Raster   inkscape: *.pdf → *.png @ 250 DPI, white
//!  └─ 4. Sync     copy *.pdf, *.png → <target_dir>/figs/
//! ```
//!
//! Everything runs sequentially and stops at the first failure.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use figsync::{convert_all, InkscapeRenderer, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder()
//!         .base_dir("/home/me/figure_tutorial")
//!         .build()?;
//!     let renderer = InkscapeRenderer::from_config(&config);
//!     let output = convert_all(&config, &renderer, "1").await?;
//!     eprintln!("{} pdf, {} png", output.stats.pdfs_written, output.stats.pngs_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `figsync` binary (clap + anyhow + tracing-subscriber + indicatif + serde_json) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod registry;
pub mod renderer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConfigFile, PipelineConfig, PipelineConfigBuilder};
pub use convert::{
    convert_all, convert_pdf_to_png, convert_svg_to_pdf, list_figures,
    sync_to_external_directory,
};
pub use error::FigSyncError;
pub use output::{FigureListing, PipelineOutput, PipelineStats, StageResult};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
pub use registry::{FigureEntry, FigureRegistry, Target};
pub use renderer::{Dialect, InkscapeRenderer, RasterOptions, Renderer};
