//! Error types for group construction, materialization, and recut passes.
//!
//! Every variant names the file or directory involved so the operator can
//! fix the underlying condition and re-run. Nothing here is retried.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::metadata::MetadataError;

/// Result type for synchronization operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Fatal error from a synchronization pass.
#[derive(Error, Debug)]
pub enum SyncError {
    /// No capture timestamp or duration could be resolved for a clip.
    #[error("No usable metadata for '{}': {source}", path.display())]
    MetadataUnavailable {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },

    /// The directory contained no supported media files.
    #[error("No supported media files in '{}'", directory.display())]
    EmptyClipGroup { directory: PathBuf },

    /// The reference clip index does not address a clip in the group.
    #[error(
        "Reference index {index} is out of range for '{}' ({count} clips)",
        directory.display()
    )]
    IndexOutOfRange {
        directory: PathBuf,
        index: usize,
        count: usize,
    },

    /// The clip directory could not be listed.
    #[error("Cannot read directory '{}': {source}", directory.display())]
    ScanFailed {
        directory: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A rename target already exists.
    #[error(
        "Cannot rename '{}' to '{}': target already exists",
        from.display(),
        to.display()
    )]
    RenameCollision { from: PathBuf, to: PathBuf },

    /// A clip referenced by the timeline is no longer on disk.
    #[error("Clip '{}' no longer exists", path.display())]
    ClipMissing { path: PathBuf },

    /// The placeholder clip used for gaps does not exist.
    #[error("Blank filler clip '{}' does not exist", path.display())]
    BlankSourceMissing { path: PathBuf },

    /// Writing into an output location failed.
    #[error("Cannot write '{}': {source}", path.display())]
    OutputDirUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The external trim tool reported a failure.
    #[error(
        "Trimming '{}' into '{}' failed: {message}",
        source_path.display(),
        destination.display()
    )]
    TrimExecutionFailed {
        source_path: PathBuf,
        destination: PathBuf,
        message: String,
    },
}

impl SyncError {
    /// Create a metadata unavailable error.
    pub fn metadata_unavailable(path: impl AsRef<Path>, source: MetadataError) -> Self {
        Self::MetadataUnavailable {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an output unwritable error.
    pub fn unwritable(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::OutputDirUnwritable {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a trim failure error.
    pub fn trim_failed(
        source_path: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        message: impl Into<String>,
    ) -> Self {
        Self::TrimExecutionFailed {
            source_path: source_path.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// The path this error is about.
    pub fn path(&self) -> &Path {
        match self {
            Self::MetadataUnavailable { path, .. }
            | Self::ClipMissing { path }
            | Self::BlankSourceMissing { path }
            | Self::OutputDirUnwritable { path, .. } => path,
            Self::EmptyClipGroup { directory }
            | Self::IndexOutOfRange { directory, .. }
            | Self::ScanFailed { directory, .. } => directory,
            Self::RenameCollision { to, .. } => to,
            Self::TrimExecutionFailed { destination, .. } => destination,
        }
    }
}
