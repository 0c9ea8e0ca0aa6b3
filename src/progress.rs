//! Progress-callback trait for per-file pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to observe the
//! pipeline as it works through each figure. The CLI uses it to drive a
//! terminal progress bar; tests use it to assert ordering.
//!
//! # Example
//!
//! ```rust
//! use figsync::{PipelineConfig, PipelineProgressCallback, Stage};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl PipelineProgressCallback for Printer {
//!     fn on_file_complete(&self, stage: Stage, figure_id: &str, output: &Path) {
//!         eprintln!("[{stage}] fig {figure_id}: {}", output.display());
//!     }
//! }
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(Arc::new(Printer))
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// `*.svg` → `*.pdf`
    SvgToPdf,
    /// `*.pdf` → `*.png`
    PdfToPng,
    /// copy `*.pdf` / `*.png` into the sync target
    Sync,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Stage::SvgToPdf => "svg→pdf",
            Stage::PdfToPng => "pdf→png",
            Stage::Sync => "sync",
        })
    }
}

/// Called by the pipeline as it processes each figure.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive strictly in order; the pipeline never
/// runs two conversions at once.
pub trait PipelineProgressCallback: Send + Sync {
    /// A stage is about to process `files` inputs for a figure.
    fn on_stage_start(&self, stage: Stage, figure_id: &str, files: usize) {
        let _ = (stage, figure_id, files);
    }

    /// One output file was written (converted or copied).
    fn on_file_complete(&self, stage: Stage, figure_id: &str, output: &Path) {
        let _ = (stage, figure_id, output);
    }

    /// One input failed. The batch aborts right after this call.
    fn on_file_error(&self, stage: Stage, figure_id: &str, input: &Path, error: &str) {
        let _ = (stage, figure_id, input, error);
    }

    /// A stage finished every input of a figure.
    fn on_stage_complete(&self, stage: Stage, figure_id: &str, written: usize) {
        let _ = (stage, figure_id, written);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
