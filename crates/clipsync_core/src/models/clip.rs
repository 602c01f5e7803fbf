//! Clip records: a media file placed on a relative timeline.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A media file found during a directory scan, before it is placed on the
/// timeline.
///
/// Metadata fields are filled in by separate passes; `None` means the pass
/// has not run yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipCandidate {
    /// Path to the media file.
    pub file_path: PathBuf,
    /// Position in the directory scan (file name order).
    pub scan_index: usize,
    /// When the recording started.
    pub capture_datetime: Option<DateTime<FixedOffset>>,
    /// Length in seconds.
    pub duration_seconds: Option<f64>,
}

impl ClipCandidate {
    /// Create a candidate with only its path known.
    pub fn new(file_path: impl Into<PathBuf>, scan_index: usize) -> Self {
        Self {
            file_path: file_path.into(),
            scan_index,
            capture_datetime: None,
            duration_seconds: None,
        }
    }

    /// Set the capture timestamp.
    pub fn with_capture_datetime(mut self, datetime: DateTime<FixedOffset>) -> Self {
        self.capture_datetime = Some(datetime);
        self
    }

    /// Set the duration.
    pub fn with_duration_seconds(mut self, duration: f64) -> Self {
        self.duration_seconds = Some(duration);
        self
    }
}

/// A clip with its position on a group's relative timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Path to the media file.
    pub file_path: PathBuf,
    /// Position in the directory scan.
    pub scan_index: usize,
    /// When the recording started.
    pub capture_datetime: DateTime<FixedOffset>,
    /// Length in seconds, never negative.
    pub duration_seconds: f64,
    /// Start offset in seconds relative to the group's reference clip,
    /// corrected by the group offset.
    pub sync_time: f64,
}

impl Clip {
    /// End of the clip on the relative timeline.
    pub fn end_time(&self) -> f64 {
        self.sync_time + self.duration_seconds
    }

    /// File name for display.
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.file_path.display().to_string())
    }

    /// Path to the media file.
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// Build a clip directly on the timeline for algorithm tests.
    pub fn clip(name: &str, sync_time: f64, duration: f64) -> Clip {
        let base = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .unwrap();
        Clip {
            file_path: PathBuf::from(name),
            scan_index: 0,
            capture_datetime: base + chrono::Duration::milliseconds((sync_time * 1000.0) as i64),
            duration_seconds: duration,
            sync_time,
        }
    }
}
