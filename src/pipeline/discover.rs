//! Target resolution and file discovery.
//!
//! Resolution runs before any renderer call: an unknown id or a missing
//! figure directory fails the whole operation while the filesystem is still
//! untouched.

use crate::config::PipelineConfig;
use crate::error::FigSyncError;
use crate::registry::{FigureEntry, Target};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A registry entry paired with its on-disk figure directory.
#[derive(Debug, Clone)]
pub struct ResolvedFigure<'a> {
    pub entry: &'a FigureEntry,
    pub dir: PathBuf,
}

impl ResolvedFigure<'_> {
    pub fn id(&self) -> &str {
        &self.entry.id
    }
}

/// Map a target to figure directories, checking each one exists.
pub fn resolve_targets<'a>(
    config: &'a PipelineConfig,
    target: &Target,
) -> Result<Vec<ResolvedFigure<'a>>, FigSyncError> {
    config
        .registry
        .select(target)?
        .into_iter()
        .map(|entry| {
            let dir = config.figure_dir(entry);
            if !dir.is_dir() {
                return Err(FigSyncError::PathNotFound { path: dir });
            }
            Ok(ResolvedFigure { entry, dir })
        })
        .collect()
}

/// List the files in `dir` (non-recursive) whose extension is `ext`,
/// sorted by path.
///
/// Matching is case-sensitive: `*.svg` does not pick up `A.SVG`. A
/// directory whose path is not valid UTF-8 cannot be expressed as a glob
/// pattern and is a [`FigSyncError::Discovery`], never an empty listing.
pub fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, FigSyncError> {
    let Some(dir_str) = dir.to_str() else {
        return Err(FigSyncError::Discovery {
            dir: dir.to_path_buf(),
            detail: "path is not valid UTF-8".into(),
        });
    };
    let escaped = glob::Pattern::escape(dir_str);
    let pattern = Path::new(&escaped).join(format!("*.{ext}"));
    let pattern = pattern.to_string_lossy();

    let paths = glob::glob(&pattern).map_err(|e| FigSyncError::Discovery {
        dir: dir.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| FigSyncError::Discovery {
            dir: dir.to_path_buf(),
            detail: e.to_string(),
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    debug!("{}: {} *.{} file(s)", dir.display(), files.len(), ext);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn lists_only_matching_extension_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.svg");
        touch(dir.path(), "a.svg");
        touch(dir.path(), "a.pdf");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "UPPER.SVG");
        fs::create_dir(dir.path().join("nested.svg")).unwrap();

        let files = files_with_extension(dir.path(), "svg").unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.svg"), dir.path().join("b.svg")]
        );
    }

    #[test]
    fn directory_with_glob_metacharacters() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("fig[1]");
        fs::create_dir(&dir).unwrap();
        touch(&dir, "plot.svg");

        let files = files_with_extension(&dir, "svg").unwrap();
        assert_eq!(files, vec![dir.join("plot.svg")]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_directory_is_a_discovery_error() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(OsStr::from_bytes(b"fig\xff"));
        if fs::create_dir(&dir).is_err() {
            // Some filesystems reject non-UTF-8 names outright.
            return;
        }
        touch(&dir, "plot.svg");

        match files_with_extension(&dir, "svg") {
            Err(FigSyncError::Discovery { dir: reported, .. }) => assert_eq!(reported, dir),
            other => panic!("expected Discovery, got {other:?}"),
        }
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(files_with_extension(dir.path(), "pdf").unwrap().is_empty());
    }

    #[test]
    fn resolve_reports_missing_figure_dir() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("paper/fig1/fig")).unwrap();
        let config = PipelineConfig::builder()
            .base_dir(root.path())
            .figures(vec![
                FigureEntry::new("1", "paper/fig1"),
                FigureEntry::new("2", "paper/fig2"),
            ])
            .build()
            .unwrap();

        let single = resolve_targets(&config, &Target::single("1")).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].dir, root.path().join("paper/fig1/fig"));

        match resolve_targets(&config, &Target::All) {
            Err(FigSyncError::PathNotFound { path }) => {
                assert_eq!(path, root.path().join("paper/fig2/fig"))
            }
            other => panic!("expected PathNotFound, got {other:?}"),
        }
    }

    #[test]
    fn resolve_unknown_id() {
        let config = PipelineConfig::default();
        assert!(matches!(
            resolve_targets(&config, &Target::single("9")),
            Err(FigSyncError::UnknownFigure { .. })
        ));
    }
}
