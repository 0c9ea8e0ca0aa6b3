//! Configuration for the figure pipeline.
//!
//! Everything the pipeline needs to know about the outside world lives in
//! [`PipelineConfig`]: where figures live, where synced outputs go, which
//! figures exist, and how to call the renderer. It is built once at startup
//! via [`PipelineConfigBuilder`] and passed by reference to every operation,
//! so tests can point it at a temporary directory.
//!
//! Values are layered: built-in defaults, then an optional TOML file
//! ([`ConfigFile`]), then whatever the caller sets on the builder afterwards
//! (the CLI uses this for environment variables and flags).

use crate::error::FigSyncError;
use crate::progress::ProgressCallback;
use crate::registry::{FigureEntry, FigureRegistry};
use crate::renderer::{Dialect, RasterOptions};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Subdirectory of the sync target that receives the figure files.
pub const SYNC_SUBDIR: &str = "figs";

/// Configuration for a pipeline run.
///
/// # Example
/// ```rust
/// use figsync::{FigureEntry, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .base_dir("/home/me/figure_tutorial")
///     .target_dir("/home/me/overleaf_example")
///     .figures(vec![FigureEntry::new("1", "paper/fig1")])
///     .build()
///     .unwrap();
/// assert_eq!(config.raster.dpi, 250);
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Root that registry paths are relative to. Default: `.`.
    pub base_dir: PathBuf,

    /// Document-preparation directory for `sync`. Outputs land in its
    /// `figs/` subdirectory. Default: unset (sync is refused).
    pub target_dir: Option<PathBuf>,

    /// Registered figures. Default: `1`, `2`, `3` → `paper/fig{1,2,3}`.
    pub registry: FigureRegistry,

    /// Renderer executable. Default: `inkscape` (looked up on `PATH`).
    pub inkscape_bin: PathBuf,

    /// Renderer command-line syntax. Default: [`Dialect::Modern`].
    pub dialect: Dialect,

    /// PNG resolution and background. Default: 250 DPI, white.
    pub raster: RasterOptions,

    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            target_dir: None,
            registry: FigureRegistry::default(),
            inkscape_bin: PathBuf::from("inkscape"),
            dialect: Dialect::default(),
            raster: RasterOptions::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("base_dir", &self.base_dir)
            .field("target_dir", &self.target_dir)
            .field("registry", &self.registry)
            .field("inkscape_bin", &self.inkscape_bin)
            .field("dialect", &self.dialect)
            .field("raster", &self.raster)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
            figures: None,
        }
    }

    /// Directory holding the sources and outputs of `entry`.
    pub fn figure_dir(&self, entry: &FigureEntry) -> PathBuf {
        entry.figure_dir(&self.base_dir)
    }

    /// `<target_dir>/figs`, or an error if no target is configured.
    pub fn sync_dir(&self) -> Result<PathBuf, FigSyncError> {
        self.target_dir
            .as_ref()
            .map(|t| t.join(SYNC_SUBDIR))
            .ok_or_else(|| {
                FigSyncError::InvalidConfig(
                    "no sync target directory configured (set target_dir or --target-dir)".into(),
                )
            })
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
    figures: Option<Vec<FigureEntry>>,
}

impl PipelineConfigBuilder {
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = dir.into();
        self
    }

    pub fn target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.target_dir = Some(dir.into());
        self
    }

    /// Replace the registry. Validated in [`build`](Self::build).
    pub fn figures(mut self, figures: Vec<FigureEntry>) -> Self {
        self.figures = Some(figures);
        self
    }

    pub fn inkscape_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.config.inkscape_bin = bin.into();
        self
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.config.dialect = dialect;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.raster.dpi = dpi;
        self
    }

    pub fn background(mut self, colour: impl Into<String>) -> Self {
        self.config.raster.background = colour.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Apply every value present in a parsed config file.
    pub fn config_file(mut self, file: ConfigFile) -> Self {
        if let Some(dir) = file.base_dir {
            self = self.base_dir(dir);
        }
        if let Some(dir) = file.target_dir {
            self = self.target_dir(dir);
        }
        if let Some(bin) = file.inkscape {
            self = self.inkscape_bin(bin);
        }
        if let Some(legacy) = file.legacy_inkscape {
            self = self.dialect(if legacy {
                Dialect::Legacy
            } else {
                Dialect::Modern
            });
        }
        if let Some(dpi) = file.dpi {
            self = self.dpi(dpi);
        }
        if let Some(bg) = file.background {
            self = self.background(bg);
        }
        if let Some(figures) = file.figures {
            self = self.figures(figures);
        }
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<PipelineConfig, FigSyncError> {
        if let Some(figures) = self.figures.take() {
            self.config.registry = FigureRegistry::new(figures)?;
        }
        let c = &self.config;
        if c.raster.dpi == 0 || c.raster.dpi > 2400 {
            return Err(FigSyncError::InvalidConfig(format!(
                "DPI must be 1–2400, got {}",
                c.raster.dpi
            )));
        }
        if c.raster.background.trim().is_empty() {
            return Err(FigSyncError::InvalidConfig(
                "background colour must not be empty".into(),
            ));
        }
        if c.inkscape_bin.as_os_str().is_empty() {
            return Err(FigSyncError::InvalidConfig(
                "inkscape binary path must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// On-disk TOML configuration. Every field is optional.
///
/// ```toml
/// base_dir = "/home/me/figure_tutorial"
/// target_dir = "/home/me/overleaf_example"
/// dpi = 250
///
/// [[figures]]
/// id = "1"
/// path = "paper/fig1"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_dir: Option<PathBuf>,
    pub target_dir: Option<PathBuf>,
    pub inkscape: Option<PathBuf>,
    pub legacy_inkscape: Option<bool>,
    pub dpi: Option<u32>,
    pub background: Option<String>,
    pub figures: Option<Vec<FigureEntry>>,
}

impl ConfigFile {
    /// Read and parse a config file.
    ///
    /// Relative `base_dir` / `target_dir` values are resolved against the
    /// directory containing the file, not the current working directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FigSyncError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| FigSyncError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut file = Self::parse(&text, path)?;

        let anchor = path.parent().unwrap_or_else(|| Path::new(""));
        file.base_dir = file.base_dir.map(|d| anchor.join(d));
        file.target_dir = file.target_dir.map(|d| anchor.join(d));
        Ok(file)
    }

    /// Parse config text. `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, FigSyncError> {
        toml::from_str(text).map_err(|e| FigSyncError::ConfigParse {
            path: origin.to_path_buf(),
            detail: e.to_string(),
        })
    }
}
