//! The external renderer: vector → PDF and PDF → PNG.
//!
//! All format conversion is delegated to Inkscape running as a subprocess.
//! The pipeline only talks to the [`Renderer`] trait, so tests can swap in a
//! recording fake and never need a real binary on `PATH`.
//!
//! ## Command-line dialects
//!
//! Inkscape changed its export flags in 1.0. [`Dialect::Legacy`] speaks the
//! 0.92 syntax (`--export-pdf=…`, `--export-png=…`, `-b`), [`Dialect::Modern`]
//! speaks the 1.x syntax (`--export-type`, `--export-filename`,
//! `--export-background`).

use crate::error::FigSyncError;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Default rasterisation resolution for PNG output.
pub const DEFAULT_DPI: u32 = 250;

/// Default PNG background colour.
pub const DEFAULT_BACKGROUND: &str = "white";

/// Rasterisation parameters for [`Renderer::pdf_to_png`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterOptions {
    /// Export resolution in dots per inch. Default: 250.
    pub dpi: u32,
    /// Background colour, any value Inkscape accepts (`white`, `#ffffff`). Default: `white`.
    pub background: String,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            background: DEFAULT_BACKGROUND.to_string(),
        }
    }
}

/// Which Inkscape command-line syntax to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Inkscape 0.92 and earlier.
    Legacy,
    /// Inkscape 1.0 and later. (default)
    #[default]
    Modern,
}

impl Dialect {
    /// Arguments that export `svg` to `pdf`.
    pub fn pdf_args(&self, svg: &Path, pdf: &Path) -> Vec<OsString> {
        match self {
            Dialect::Legacy => vec![svg.into(), flag_with_path("--export-pdf=", pdf)],
            Dialect::Modern => vec![
                svg.into(),
                "--export-type=pdf".into(),
                flag_with_path("--export-filename=", pdf),
            ],
        }
    }

    /// Arguments that rasterise `pdf` to `png`.
    pub fn png_args(&self, pdf: &Path, png: &Path, raster: &RasterOptions) -> Vec<OsString> {
        match self {
            Dialect::Legacy => vec![
                pdf.into(),
                flag_with_path("--export-png=", png),
                "-b".into(),
                raster.background.as_str().into(),
                format!("--export-dpi={}", raster.dpi).into(),
            ],
            Dialect::Modern => vec![
                pdf.into(),
                "--export-type=png".into(),
                flag_with_path("--export-filename=", png),
                format!("--export-background={}", raster.background).into(),
                format!("--export-dpi={}", raster.dpi).into(),
            ],
        }
    }
}

fn flag_with_path(flag: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(path);
    arg
}

/// Capability to convert figure files between formats.
///
/// Each call must block (asynchronously) until the output file is written
/// or the conversion has failed. Implementations overwrite existing outputs.
pub trait Renderer: Send + Sync {
    /// Export a vector file to PDF.
    fn svg_to_pdf(
        &self,
        svg: &Path,
        pdf: &Path,
    ) -> impl Future<Output = Result<(), FigSyncError>> + Send;

    /// Rasterise a PDF to PNG.
    fn pdf_to_png(
        &self,
        pdf: &Path,
        png: &Path,
        raster: &RasterOptions,
    ) -> impl Future<Output = Result<(), FigSyncError>> + Send;
}

/// [`Renderer`] backed by an Inkscape subprocess.
#[derive(Debug, Clone)]
pub struct InkscapeRenderer {
    program: PathBuf,
    dialect: Dialect,
}

impl Default for InkscapeRenderer {
    fn default() -> Self {
        Self::new("inkscape", Dialect::default())
    }
}

impl InkscapeRenderer {
    pub fn new(program: impl Into<PathBuf>, dialect: Dialect) -> Self {
        Self {
            program: program.into(),
            dialect,
        }
    }

    /// Renderer configured from [`crate::config::PipelineConfig`].
    pub fn from_config(config: &crate::config::PipelineConfig) -> Self {
        Self::new(config.inkscape_bin.clone(), config.dialect)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Spawn the tool, wait for it, and turn a non-zero exit into an error.
    async fn run(&self, input: &Path, args: Vec<OsString>) -> Result<(), FigSyncError> {
        let tool = self.program.display().to_string();
        debug!("Running {} {:?}", tool, args);

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| FigSyncError::ConversionTool {
                tool: tool.clone(),
                input: input.to_path_buf(),
                status: None,
                stderr: e.to_string(),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(FigSyncError::ConversionTool {
                tool,
                input: input.to_path_buf(),
                status: output.status.code(),
                stderr,
            });
        }

        if !stderr.is_empty() {
            debug!("{} stderr: {}", tool, stderr);
        }
        Ok(())
    }
}

impl Renderer for InkscapeRenderer {
    async fn svg_to_pdf(&self, svg: &Path, pdf: &Path) -> Result<(), FigSyncError> {
        self.run(svg, self.dialect.pdf_args(svg, pdf)).await
    }

    async fn pdf_to_png(
        &self,
        pdf: &Path,
        png: &Path,
        raster: &RasterOptions,
    ) -> Result<(), FigSyncError> {
        self.run(pdf, self.dialect.png_args(pdf, png, raster)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn raster_defaults_are_250_dpi_white() {
        let r = RasterOptions::default();
        assert_eq!(r.dpi, 250);
        assert_eq!(r.background, "white");
    }

    #[test]
    fn legacy_pdf_args() {
        let args = Dialect::Legacy.pdf_args(Path::new("fig/a.svg"), Path::new("fig/a.pdf"));
        assert_eq!(strings(args), vec!["fig/a.svg", "--export-pdf=fig/a.pdf"]);
    }

    #[test]
    fn legacy_png_args() {
        let args = Dialect::Legacy.png_args(
            Path::new("fig/a.pdf"),
            Path::new("fig/a.png"),
            &RasterOptions::default(),
        );
        assert_eq!(
            strings(args),
            vec![
                "fig/a.pdf",
                "--export-png=fig/a.png",
                "-b",
                "white",
                "--export-dpi=250"
            ]
        );
    }

    #[test]
    fn modern_png_args() {
        let raster = RasterOptions {
            dpi: 300,
            background: "#000000".into(),
        };
        let args = Dialect::Modern.png_args(Path::new("a.pdf"), Path::new("a.png"), &raster);
        assert_eq!(
            strings(args),
            vec![
                "a.pdf",
                "--export-type=png",
                "--export-filename=a.png",
                "--export-background=#000000",
                "--export-dpi=300"
            ]
        );
    }

    #[test]
    fn modern_pdf_args() {
        let args = Dialect::Modern.pdf_args(Path::new("a.svg"), Path::new("a.pdf"));
        assert_eq!(
            strings(args),
            vec!["a.svg", "--export-type=pdf", "--export-filename=a.pdf"]
        );
    }

    #[tokio::test]
    async fn missing_binary_is_a_conversion_tool_error() {
        let r = InkscapeRenderer::new("/definitely/not/inkscape", Dialect::Modern);
        let err = r
            .svg_to_pdf(Path::new("a.svg"), Path::new("a.pdf"))
            .await
            .unwrap_err();
        match err {
            FigSyncError::ConversionTool { status, input, .. } => {
                assert_eq!(status, None);
                assert_eq!(input, PathBuf::from("a.svg"));
            }
            other => panic!("expected ConversionTool, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_a_conversion_tool_error() {
        // `false` ignores its arguments and exits 1.
        let r = InkscapeRenderer::new("false", Dialect::Legacy);
        let err = r
            .pdf_to_png(
                Path::new("a.pdf"),
                Path::new("a.png"),
                &RasterOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FigSyncError::ConversionTool {
                status: Some(1),
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_success() {
        let r = InkscapeRenderer::new("true", Dialect::Modern);
        r.svg_to_pdf(Path::new("a.svg"), Path::new("a.pdf"))
            .await
            .expect("`true` exits 0");
    }
}
