//! Run one conversion over every matching file of one figure.
//!
//! Inputs are discovered when the stage starts, so a PDF→PNG stage that
//! follows an SVG→PDF stage sees the freshly written PDFs. Outputs go next to
//! their inputs with the extension swapped and are overwritten on re-runs.

use crate::config::PipelineConfig;
use crate::error::FigSyncError;
use crate::output::StageResult;
use crate::pipeline::discover::{self, ResolvedFigure};
use crate::progress::Stage;
use crate::renderer::Renderer;
use tracing::{info, warn};

/// A renderer-backed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    SvgToPdf,
    PdfToPng,
}

impl Conversion {
    pub fn stage(self) -> Stage {
        match self {
            Conversion::SvgToPdf => Stage::SvgToPdf,
            Conversion::PdfToPng => Stage::PdfToPng,
        }
    }

    /// `(input, output)` file extensions.
    pub fn extensions(self) -> (&'static str, &'static str) {
        match self {
            Conversion::SvgToPdf => ("svg", "pdf"),
            Conversion::PdfToPng => ("pdf", "png"),
        }
    }
}

/// Convert every input of `figure`. Stops at the first renderer failure.
pub async fn run_conversion<R: Renderer>(
    renderer: &R,
    config: &PipelineConfig,
    conversion: Conversion,
    figure: &ResolvedFigure<'_>,
) -> Result<StageResult, FigSyncError> {
    let stage = conversion.stage();
    let (input_ext, output_ext) = conversion.extensions();
    let inputs = discover::files_with_extension(&figure.dir, input_ext)?;

    if inputs.is_empty() {
        warn!(
            "Figure {}: no *.{} files in {}",
            figure.id(),
            input_ext,
            figure.dir.display()
        );
    } else {
        info!(
            "Figure {}: {} {} file(s)",
            figure.id(),
            stage,
            inputs.len()
        );
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage, figure.id(), inputs.len());
    }

    let mut outputs = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let output = input.with_extension(output_ext);
        let result = match conversion {
            Conversion::SvgToPdf => renderer.svg_to_pdf(input, &output).await,
            Conversion::PdfToPng => renderer.pdf_to_png(input, &output, &config.raster).await,
        };

        if let Err(e) = result {
            if let Some(ref cb) = config.progress_callback {
                cb.on_file_error(stage, figure.id(), input, &e.to_string());
            }
            return Err(e);
        }

        if let Some(ref cb) = config.progress_callback {
            cb.on_file_complete(stage, figure.id(), &output);
        }
        outputs.push(output);
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(stage, figure.id(), outputs.len());
    }

    Ok(StageResult {
        stage,
        figure_id: figure.id().to_string(),
        dir: figure.dir.clone(),
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_extensions() {
        assert_eq!(Conversion::SvgToPdf.extensions(), ("svg", "pdf"));
        assert_eq!(Conversion::PdfToPng.extensions(), ("pdf", "png"));
        assert_eq!(Conversion::PdfToPng.stage(), Stage::PdfToPng);
    }
}
