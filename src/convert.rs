//! Pipeline entry points.
//!
//! Every operation resolves its targets first (registry lookup plus a
//! directory check), then runs its stages one figure at a time in registry
//! order. The first failure aborts the operation; nothing after it runs.

use crate::config::PipelineConfig;
use crate::error::FigSyncError;
use crate::output::{FigureListing, PipelineOutput};
use crate::pipeline::discover::{self, ResolvedFigure};
use crate::pipeline::render::{self, Conversion};
use crate::pipeline::sync;
use crate::registry::Target;
use crate::renderer::Renderer;
use std::time::Instant;
use tracing::info;

/// Export every `*.svg` of the target figure(s) to a same-named `*.pdf`.
///
/// # Errors
/// - [`FigSyncError::UnknownFigure`] for an id not in the registry
/// - [`FigSyncError::PathNotFound`] if a figure directory is missing
/// - [`FigSyncError::ConversionTool`] on the first renderer failure
pub async fn convert_svg_to_pdf<R: Renderer>(
    config: &PipelineConfig,
    renderer: &R,
    target: &Target,
) -> Result<PipelineOutput, FigSyncError> {
    run_conversions(config, renderer, target, &[Conversion::SvgToPdf]).await
}

/// Rasterise every `*.pdf` of the target figure(s) to a same-named `*.png`
/// using [`PipelineConfig::raster`] (250 DPI on white by default).
pub async fn convert_pdf_to_png<R: Renderer>(
    config: &PipelineConfig,
    renderer: &R,
    target: &Target,
) -> Result<PipelineOutput, FigSyncError> {
    run_conversions(config, renderer, target, &[Conversion::PdfToPng]).await
}

/// SVG → PDF, then PDF → PNG, for one figure.
pub async fn convert_all<R: Renderer>(
    config: &PipelineConfig,
    renderer: &R,
    figure_id: &str,
) -> Result<PipelineOutput, FigSyncError> {
    run_conversions(
        config,
        renderer,
        &Target::single(figure_id),
        &[Conversion::SvgToPdf, Conversion::PdfToPng],
    )
    .await
}

/// Run [`convert_all`] for one figure, then copy its `*.pdf` and `*.png`
/// files into `<target_dir>/figs/`.
///
/// The sync directory is checked before any conversion starts, so a missing
/// target fails fast instead of after a full render.
pub async fn sync_to_external_directory<R: Renderer>(
    config: &PipelineConfig,
    renderer: &R,
    figure_id: &str,
) -> Result<PipelineOutput, FigSyncError> {
    let start = Instant::now();
    let sync_dir = config.sync_dir()?;
    let target = Target::single(figure_id);
    let figures = discover::resolve_targets(config, &target)?;
    sync::ensure_target(&sync_dir).await?;

    let mut output = convert_all(config, renderer, figure_id).await?;
    for figure in &figures {
        output.push(sync::copy_outputs(config, figure, &sync_dir).await?);
    }

    output.stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Synced figure {}: {} file(s) copied to {} in {}ms",
        figure_id,
        output.stats.files_copied,
        sync_dir.display(),
        output.stats.duration_ms
    );
    Ok(output)
}

/// Describe every registered figure and whether its directory exists.
pub fn list_figures(config: &PipelineConfig) -> Vec<FigureListing> {
    config
        .registry
        .entries()
        .iter()
        .map(|entry| {
            let dir = config.figure_dir(entry);
            FigureListing {
                id: entry.id.clone(),
                path: entry.path.clone(),
                exists: dir.is_dir(),
                dir,
            }
        })
        .collect()
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve `target`, then for each figure in order run `conversions` in order.
async fn run_conversions<R: Renderer>(
    config: &PipelineConfig,
    renderer: &R,
    target: &Target,
    conversions: &[Conversion],
) -> Result<PipelineOutput, FigSyncError> {
    let start = Instant::now();
    let figures = discover::resolve_targets(config, target)?;
    info!("Converting {} figure(s)", figures.len());

    let mut output = PipelineOutput::default();
    for figure in &figures {
        output.extend(convert_figure(config, renderer, figure, conversions).await?);
    }

    output.stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Conversion complete: {} figure(s), {} pdf, {} png, {}ms",
        output.stats.figures,
        output.stats.pdfs_written,
        output.stats.pngs_written,
        output.stats.duration_ms
    );
    Ok(output)
}

async fn convert_figure<R: Renderer>(
    config: &PipelineConfig,
    renderer: &R,
    figure: &ResolvedFigure<'_>,
    conversions: &[Conversion],
) -> Result<PipelineOutput, FigSyncError> {
    let mut output = PipelineOutput::default();
    for &conversion in conversions {
        output.push(render::run_conversion(renderer, config, conversion, figure).await?);
    }
    Ok(output)
}
