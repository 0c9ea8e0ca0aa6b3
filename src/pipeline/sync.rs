//! Copy finished figure outputs into the external sync directory.
//!
//! Each file is written to `<name>.<ext>.tmp` in the target directory and
//! renamed into place, so an interrupted copy never leaves a truncated
//! figure where the document build would pick it up.

use crate::config::PipelineConfig;
use crate::error::FigSyncError;
use crate::output::StageResult;
use crate::pipeline::discover::{self, ResolvedFigure};
use crate::progress::Stage;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extensions copied by [`copy_outputs`], in copy order.
pub const SYNCED_EXTENSIONS: [&str; 2] = ["pdf", "png"];

/// Fail unless `sync_dir` is an existing directory.
pub async fn ensure_target(sync_dir: &Path) -> Result<(), FigSyncError> {
    match tokio::fs::metadata(sync_dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(FigSyncError::SyncTargetMissing {
            path: sync_dir.to_path_buf(),
        }),
        Err(e) => Err(target_error(sync_dir, e)),
    }
}

/// Only "nothing there" counts as missing; anything else keeps its cause.
fn target_error(sync_dir: &Path, source: std::io::Error) -> FigSyncError {
    match source.kind() {
        ErrorKind::NotFound | ErrorKind::NotADirectory => FigSyncError::SyncTargetMissing {
            path: sync_dir.to_path_buf(),
        },
        _ => FigSyncError::SyncTargetUnreadable {
            path: sync_dir.to_path_buf(),
            source,
        },
    }
}

/// Copy every `*.pdf` then every `*.png` of `figure` into `sync_dir`.
///
/// Existing files in `sync_dir` with the same name are replaced. Source
/// files are left untouched.
pub async fn copy_outputs(
    config: &PipelineConfig,
    figure: &ResolvedFigure<'_>,
    sync_dir: &Path,
) -> Result<StageResult, FigSyncError> {
    ensure_target(sync_dir).await?;

    let mut files = Vec::new();
    for ext in SYNCED_EXTENSIONS {
        files.extend(discover::files_with_extension(&figure.dir, ext)?);
    }

    info!(
        "Figure {}: copying {} file(s) to {}",
        figure.id(),
        files.len(),
        sync_dir.display()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(Stage::Sync, figure.id(), files.len());
    }

    let mut outputs = Vec::with_capacity(files.len());
    for file in &files {
        let dest = match copy_atomic(file, sync_dir).await {
            Ok(dest) => dest,
            Err(e) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_error(Stage::Sync, figure.id(), file, &e.to_string());
                }
                return Err(e);
            }
        };
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_complete(Stage::Sync, figure.id(), &dest);
        }
        outputs.push(dest);
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(Stage::Sync, figure.id(), outputs.len());
    }

    Ok(StageResult {
        stage: Stage::Sync,
        figure_id: figure.id().to_string(),
        dir: figure.dir.clone(),
        outputs,
    })
}

/// Copy `src` into `dir` under the same file name via a temp file + rename.
async fn copy_atomic(src: &Path, dir: &Path) -> Result<PathBuf, FigSyncError> {
    let name = src.file_name().ok_or_else(|| FigSyncError::CopyFailed {
        from: src.to_path_buf(),
        to: dir.to_path_buf(),
        source: std::io::Error::new(ErrorKind::InvalidInput, "path has no file name"),
    })?;
    let dest = dir.join(name);
    let mut tmp_name = name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = dir.join(tmp_name);

    let copy_err = |source: std::io::Error| FigSyncError::CopyFailed {
        from: src.to_path_buf(),
        to: dest.clone(),
        source,
    };

    if let Err(e) = tokio::fs::copy(src, &tmp).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(copy_err(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp, &dest).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(copy_err(e));
    }

    debug!("Copied {} → {}", src.display(), dest.display());
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copy_atomic_replaces_and_leaves_no_temp() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("plot.png");
        std::fs::write(&src, b"new").unwrap();
        std::fs::write(dst_dir.path().join("plot.png"), b"old").unwrap();

        let dest = copy_atomic(&src, dst_dir.path()).await.unwrap();

        assert_eq!(dest, dst_dir.path().join("plot.png"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
        assert!(!dst_dir.path().join("plot.png.tmp").exists());
        assert_eq!(std::fs::read(&src).unwrap(), b"new");
    }

    #[tokio::test]
    async fn ensure_target_rejects_missing_and_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_target(dir.path()).await.is_ok());

        let missing = dir.path().join("figs");
        assert!(matches!(
            ensure_target(&missing).await,
            Err(FigSyncError::SyncTargetMissing { .. })
        ));

        std::fs::write(&missing, b"").unwrap();
        assert!(matches!(
            ensure_target(&missing).await,
            Err(FigSyncError::SyncTargetMissing { .. })
        ));

        // A path "below" a regular file fails with ENOTDIR: still missing.
        assert!(matches!(
            ensure_target(&missing.join("figs")).await,
            Err(FigSyncError::SyncTargetMissing { .. })
        ));
    }

    #[test]
    fn unreadable_target_keeps_io_cause() {
        use std::error::Error as _;

        let denied = std::io::Error::new(ErrorKind::PermissionDenied, "denied");
        let err = target_error(Path::new("/srv/overleaf/figs"), denied);
        match &err {
            FigSyncError::SyncTargetUnreadable { path, source } => {
                assert_eq!(path, Path::new("/srv/overleaf/figs"));
                assert_eq!(source.kind(), ErrorKind::PermissionDenied);
            }
            other => panic!("expected SyncTargetUnreadable, got {other:?}"),
        }
        assert!(err.source().is_some());

        let gone = std::io::Error::from(ErrorKind::NotFound);
        assert!(matches!(
            target_error(Path::new("figs"), gone),
            FigSyncError::SyncTargetMissing { .. }
        ));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn failed_copy_removes_temp_file() {
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("plot.pdf");
        std::fs::write(&src, b"%PDF-1.5 figure").unwrap();

        // Writes through the temp name land on a device that is always full.
        let tmp = dst_dir.path().join("plot.pdf.tmp");
        std::os::unix::fs::symlink(full, &tmp).unwrap();

        match copy_atomic(&src, dst_dir.path()).await {
            Err(FigSyncError::CopyFailed { from, to, .. }) => {
                assert_eq!(from, src);
                assert_eq!(to, dst_dir.path().join("plot.pdf"));
            }
            other => panic!("expected CopyFailed, got {other:?}"),
        }
        assert!(
            std::fs::symlink_metadata(&tmp).is_err(),
            "temp file left behind after a failed copy"
        );
        assert!(!dst_dir.path().join("plot.pdf").exists());
    }
}
