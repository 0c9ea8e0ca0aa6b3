//! Error types for the figsync library.
//!
//! Every failure is fatal for the current task: [`FigSyncError`] is returned
//! as `Err` from the `convert*` and `sync*` entry points and the batch stops
//! at the first one. There is no per-file error channel; a half-converted
//! figure directory is reported as a failure, not as partial success.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the figsync library.
#[derive(Debug, Error)]
pub enum FigSyncError {
    // ── Registry errors ───────────────────────────────────────────────────
    /// The figure identifier is not present in the registry.
    #[error("Unknown figure '{id}'. Registered figures: {}", .known.join(", "))]
    UnknownFigure { id: String, known: Vec<String> },

    /// A figure directory (or another required path) does not exist.
    #[error("Path not found: '{path}'\nCheck base_dir and the figure's registry path.")]
    PathNotFound { path: PathBuf },

    /// Globbing a figure directory failed.
    #[error("Failed to list files in '{dir}': {detail}")]
    Discovery { dir: PathBuf, detail: String },

    // ── Renderer errors ───────────────────────────────────────────────────
    /// The external renderer exited non-zero or could not be started.
    ///
    /// `status` is `None` when the process never ran (binary missing,
    /// permission denied) or was killed by a signal.
    #[error(
        "{tool} failed on '{input}' (exit status: {}):\n{stderr}",
        .status.map(|s| s.to_string()).unwrap_or_else(|| "none".into())
    )]
    ConversionTool {
        tool: String,
        input: PathBuf,
        status: Option<i32>,
        stderr: String,
    },

    // ── Sync errors ───────────────────────────────────────────────────────
    /// The external sync directory does not exist.
    #[error("Sync target directory not found: '{path}'\nCreate it first; figsync never creates it.")]
    SyncTargetMissing { path: PathBuf },

    /// The sync directory exists (or may exist) but could not be inspected.
    #[error("Cannot access sync target directory '{path}': {source}")]
    SyncTargetUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Copying a single output into the sync directory failed.
    #[error("Failed to copy '{from}' to '{to}': {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The config file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has the wrong shape.
    #[error("Failed to parse config file '{path}': {detail}")]
    ConfigParse { path: PathBuf, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_figure_lists_known_ids() {
        let e = FigSyncError::UnknownFigure {
            id: "9".into(),
            known: vec!["1".into(), "2".into(), "3".into()],
        };
        let msg = e.to_string();
        assert!(msg.contains("'9'"), "got: {msg}");
        assert!(msg.contains("1, 2, 3"), "got: {msg}");
    }

    #[test]
    fn conversion_tool_display_with_status() {
        let e = FigSyncError::ConversionTool {
            tool: "inkscape".into(),
            input: PathBuf::from("fig/a.svg"),
            status: Some(1),
            stderr: "parser error".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("exit status: 1"), "got: {msg}");
        assert!(msg.contains("parser error"));
        assert!(msg.contains("fig/a.svg"));
    }

    #[test]
    fn conversion_tool_display_without_status() {
        let e = FigSyncError::ConversionTool {
            tool: "inkscape".into(),
            input: PathBuf::from("a.pdf"),
            status: None,
            stderr: "No such file or directory".into(),
        };
        assert!(e.to_string().contains("exit status: none"));
    }

    #[test]
    fn copy_failed_keeps_source() {
        use std::error::Error as _;
        let e = FigSyncError::CopyFailed {
            from: "a.png".into(),
            to: "figs/a.png".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("figs/a.png"));
    }

    #[test]
    fn sync_target_unreadable_names_path_and_cause() {
        let e = FigSyncError::SyncTargetUnreadable {
            path: "overleaf/figs".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = e.to_string();
        assert!(msg.contains("overleaf/figs"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }
}
