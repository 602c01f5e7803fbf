//! Clip metadata providers.
//!
//! Group construction only needs two facts per file: when the recording
//! started and how long it is. Both come from a [`MetadataProvider`], which
//! is injected so the timeline logic never touches external tools directly.
//!
//! - **exiftool**: capture timestamps, tried in a fixed tag priority order
//!   (`DateTimeOriginal`, then `CreateDate` by default)
//! - **ffprobe**: container duration, with exiftool's `Duration` as fallback
//! - **static**: an in-memory table for tests and replays
//!
//! # Usage
//!
//! ```ignore
//! use clipsync_core::metadata::{MetadataProvider, ToolMetadataProvider};
//!
//! let provider = ToolMetadataProvider::new("exiftool", "ffprobe", vec!["DateTimeOriginal".into()]);
//! let started = provider.capture_datetime(Path::new("/footage/wide/00001.MTS"))?;
//! let length = provider.duration_seconds(Path::new("/footage/wide/00001.MTS"))?;
//! ```

mod datetime;
mod exiftool;
mod ffprobe;
mod static_provider;

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

pub use datetime::parse_capture_datetime;
pub use exiftool::ExifToolProvider;
pub use ffprobe::{parse_duration_output, FfprobeDurationProbe};
pub use static_provider::StaticMetadataProvider;

/// Errors from metadata lookups.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The external tool could not be started.
    #[error("Failed to run {tool}: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The external tool exited with a failure status.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// Tool output or a tag value could not be parsed.
    #[error("Failed to parse {what}: {message}")]
    ParseError { what: String, message: String },

    /// None of the timestamp tags were present.
    #[error("None of the tags {} are present", tags.join(", "))]
    TagMissing { tags: Vec<String> },

    /// The reported duration is negative or not a number.
    #[error("Invalid duration: {0}")]
    InvalidDuration(f64),

    /// The provider has no record for the file.
    #[error("No metadata recorded for this file")]
    NotFound,
}

impl MetadataError {
    /// Create a parse error.
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            what: what.into(),
            message: message.into(),
        }
    }
}

/// Result type for metadata lookups.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Source of capture timestamps and durations.
///
/// Implementations must be shareable across threads: the base and
/// secondary groups may be loaded in parallel.
pub trait MetadataProvider: Send + Sync {
    /// Warm up the provider for a batch of files.
    ///
    /// Providers that can answer many files with one tool invocation do it
    /// here. The default does nothing; lookups then go file by file.
    fn prefetch(&self, _paths: &[PathBuf]) -> MetadataResult<()> {
        Ok(())
    }

    /// When the recording in `path` started.
    fn capture_datetime(&self, path: &Path) -> MetadataResult<DateTime<FixedOffset>>;

    /// Length of the recording in `path`, in seconds.
    fn duration_seconds(&self, path: &Path) -> MetadataResult<f64>;
}

/// Timestamps from exiftool, durations from ffprobe.
pub struct ToolMetadataProvider {
    exiftool: ExifToolProvider,
    ffprobe: FfprobeDurationProbe,
}

impl ToolMetadataProvider {
    /// Create a provider using the given tool binaries.
    pub fn new(
        exiftool_path: impl Into<PathBuf>,
        ffprobe_path: impl Into<PathBuf>,
        datetime_tags: Vec<String>,
    ) -> Self {
        Self {
            exiftool: ExifToolProvider::new(exiftool_path, datetime_tags),
            ffprobe: FfprobeDurationProbe::new(ffprobe_path),
        }
    }
}

impl MetadataProvider for ToolMetadataProvider {
    fn prefetch(&self, paths: &[PathBuf]) -> MetadataResult<()> {
        self.exiftool.prefetch(paths)
    }

    fn capture_datetime(&self, path: &Path) -> MetadataResult<DateTime<FixedOffset>> {
        self.exiftool.capture_datetime(path)
    }

    fn duration_seconds(&self, path: &Path) -> MetadataResult<f64> {
        match self.ffprobe.duration_seconds(path) {
            Ok(duration) => Ok(duration),
            Err(probe_err) => {
                tracing::warn!(
                    "ffprobe could not read duration of {}: {}; trying exiftool",
                    path.display(),
                    probe_err
                );
                self.exiftool.duration_seconds(path)
            }
        }
    }
}

/// Reject durations that cannot be placed on a timeline.
pub(crate) fn validate_duration(duration: f64) -> MetadataResult<f64> {
    if duration.is_finite() && duration >= 0.0 {
        Ok(duration)
    } else {
        Err(MetadataError::InvalidDuration(duration))
    }
}

/// Run an external tool and return its output if it succeeded.
pub(crate) fn run_tool(program: &Path, args: &[String]) -> MetadataResult<Output> {
    let tool = program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string());

    tracing::debug!("Running: {} {}", program.display(), args.join(" "));

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| MetadataError::ToolUnavailable {
            tool: tool.clone(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MetadataError::CommandFailed {
            tool,
            exit_code: output.status.code().unwrap_or(-1),
            message: stderr.trim().to_string(),
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_duration_is_rejected() {
        assert!(validate_duration(-0.5).is_err());
        assert!(validate_duration(f64::NAN).is_err());
        assert_eq!(validate_duration(0.0).unwrap(), 0.0);
    }

    #[test]
    fn missing_tool_is_reported() {
        let err = run_tool(
            Path::new("/nonexistent/clipsync-no-such-tool"),
            &["-v".to_string()],
        )
        .unwrap_err();
        match err {
            MetadataError::ToolUnavailable { tool, .. } => {
                assert_eq!(tool, "clipsync-no-such-tool");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn tag_missing_lists_tags() {
        let err = MetadataError::TagMissing {
            tags: vec!["DateTimeOriginal".to_string(), "CreateDate".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "None of the tags DateTimeOriginal, CreateDate are present"
        );
    }
}
