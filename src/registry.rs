//! The figure registry: an ordered, immutable id → directory mapping.
//!
//! Order matters. `Target::All` walks the registry in declaration order, so a
//! `Vec` is used instead of a `HashMap`.

use crate::error::FigSyncError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Name of the per-figure subdirectory holding sources and outputs.
pub const FIGURE_SUBDIR: &str = "fig";

/// One registered figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureEntry {
    /// Short identifier used on the command line, e.g. `"1"`.
    pub id: String,
    /// Directory relative to the base directory, e.g. `paper/fig1`.
    pub path: PathBuf,
}

impl FigureEntry {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    /// `<base_dir>/<path>/fig`
    pub fn figure_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.path).join(FIGURE_SUBDIR)
    }
}

/// Ordered set of figures known to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureRegistry {
    entries: Vec<FigureEntry>,
}

impl Default for FigureRegistry {
    fn default() -> Self {
        Self {
            entries: vec![
                FigureEntry::new("1", "paper/fig1"),
                FigureEntry::new("2", "paper/fig2"),
                FigureEntry::new("3", "paper/fig3"),
            ],
        }
    }
}

impl FigureRegistry {
    /// Build a registry, rejecting empty or duplicate identifiers.
    pub fn new(entries: Vec<FigureEntry>) -> Result<Self, FigSyncError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.id.trim().is_empty() {
                return Err(FigSyncError::InvalidConfig(
                    "figure id must not be empty".into(),
                ));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(FigSyncError::InvalidConfig(format!(
                    "duplicate figure id '{}'",
                    entry.id
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[FigureEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    /// Look up a figure by id.
    pub fn get(&self, id: &str) -> Result<&FigureEntry, FigSyncError> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| FigSyncError::UnknownFigure {
                id: id.to_string(),
                known: self.ids(),
            })
    }

    /// Expand a [`Target`] into the entries it names, in registry order.
    pub fn select(&self, target: &Target) -> Result<Vec<&FigureEntry>, FigSyncError> {
        match target {
            Target::All => Ok(self.entries.iter().collect()),
            Target::Single(id) => Ok(vec![self.get(id)?]),
        }
    }
}

/// Which figures an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Target {
    /// Every registered figure, in registry order.
    #[default]
    All,
    /// One figure by id.
    Single(String),
}

impl Target {
    pub fn single(id: impl Into<String>) -> Self {
        Target::Single(id.into())
    }
}

impl From<Option<String>> for Target {
    fn from(id: Option<String>) -> Self {
        match id {
            Some(id) => Target::Single(id),
            None => Target::All,
        }
    }
}
