//! Unified error types for the hwinject workspace.
//!
//! Every variant carries the path it failed on, and mount failures also
//! carry the stage, so a single message is enough to tell which file and
//! which step broke.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{FileKind, MountStage};

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum InjectError {
    /// A constructed path reached the platform path-length limit.
    #[error("path too long: {path}")]
    PathTooLong {
        /// The (truncated-for-display) path that overflowed.
        path: PathBuf,
    },

    /// A path could not be used to derive a destination.
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Following symlinks inside the container rootfs failed.
    #[error("failed to resolve {path} inside rootfs: {source}")]
    Resolve {
        /// Path being resolved.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Removing a pre-existing node failed for a reason other than absence.
    #[error("failed to remove {path}: {source}")]
    Remove {
        /// Node that could not be removed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Reading a host symlink failed.
    #[error("failed to read symlink {path}: {source}")]
    ReadLink {
        /// The host symlink.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The host file is neither a regular file nor a symlink.
    #[error("unsupported file type {kind} at {path}")]
    UnsupportedFileType {
        /// The host file.
        path: PathBuf,
        /// What was found instead.
        kind: FileKind,
    },

    /// One of the two bind-mount stages failed.
    #[error("{stage} of {src} at {target} failed: {source}")]
    Mount {
        /// Which stage failed.
        stage: MountStage,
        /// Host source file.
        src: PathBuf,
        /// Destination inside the container.
        target: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A host-file manifest line could not be parsed.
    #[error("manifest line {line}: {message}")]
    Manifest {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl InjectError {
    /// Wraps an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, InjectError>;
