//! Run reports returned by the pipeline entry points.

use crate::progress::Stage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Files one stage produced for one figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: Stage,
    pub figure_id: String,
    /// The figure directory the inputs were taken from.
    pub dir: PathBuf,
    /// Outputs in the order they were written.
    pub outputs: Vec<PathBuf>,
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub figures: usize,
    pub pdfs_written: usize,
    pub pngs_written: usize,
    pub files_copied: usize,
    pub duration_ms: u64,
}

/// Everything a pipeline operation did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub stages: Vec<StageResult>,
    pub stats: PipelineStats,
}

impl PipelineOutput {
    pub(crate) fn push(&mut self, result: StageResult) {
        let n = result.outputs.len();
        match result.stage {
            Stage::SvgToPdf => self.stats.pdfs_written += n,
            Stage::PdfToPng => self.stats.pngs_written += n,
            Stage::Sync => self.stats.files_copied += n,
        }
        if !self.stages.iter().any(|s| s.figure_id == result.figure_id) {
            self.stats.figures += 1;
        }
        self.stages.push(result);
    }

    /// Fold another run's stages into this one.
    pub(crate) fn extend(&mut self, other: PipelineOutput) {
        for stage in other.stages {
            self.push(stage);
        }
    }

    /// All outputs of one stage, across figures, in processing order.
    pub fn outputs(&self, stage: Stage) -> Vec<&PathBuf> {
        self.stages
            .iter()
            .filter(|s| s.stage == stage)
            .flat_map(|s| s.outputs.iter())
            .collect()
    }
}

/// One row of `list-figures`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureListing {
    pub id: String,
    pub path: PathBuf,
    pub dir: PathBuf,
    pub exists: bool,
}
