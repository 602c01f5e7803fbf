//! In-memory metadata table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};

use super::{validate_duration, MetadataError, MetadataProvider, MetadataResult};

#[derive(Debug, Clone, Default)]
struct Entry {
    capture_datetime: Option<DateTime<FixedOffset>>,
    duration_seconds: Option<f64>,
}

/// Answers lookups from a fixed table.
///
/// Used for replaying a recorded scan and for deterministic tests. Files
/// missing from the table, or missing a field, report [`MetadataError::NotFound`]
/// or [`MetadataError::TagMissing`].
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataProvider {
    entries: HashMap<PathBuf, Entry>,
}

impl StaticMetadataProvider {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record both facts for a file.
    pub fn insert(
        &mut self,
        path: impl Into<PathBuf>,
        capture_datetime: DateTime<FixedOffset>,
        duration_seconds: f64,
    ) -> &mut Self {
        self.entries.insert(
            path.into(),
            Entry {
                capture_datetime: Some(capture_datetime),
                duration_seconds: Some(duration_seconds),
            },
        );
        self
    }

    /// Record a file whose timestamp cannot be resolved.
    pub fn insert_without_datetime(
        &mut self,
        path: impl Into<PathBuf>,
        duration_seconds: f64,
    ) -> &mut Self {
        self.entries.insert(
            path.into(),
            Entry {
                capture_datetime: None,
                duration_seconds: Some(duration_seconds),
            },
        );
        self
    }

    /// Number of files in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, path: &Path) -> MetadataResult<&Entry> {
        self.entries.get(path).ok_or(MetadataError::NotFound)
    }
}

impl MetadataProvider for StaticMetadataProvider {
    fn capture_datetime(&self, path: &Path) -> MetadataResult<DateTime<FixedOffset>> {
        self.entry(path)?
            .capture_datetime
            .ok_or_else(|| MetadataError::TagMissing {
                tags: vec!["capture_datetime".to_string()],
            })
    }

    fn duration_seconds(&self, path: &Path) -> MetadataResult<f64> {
        let duration = self
            .entry(path)?
            .duration_seconds
            .ok_or_else(|| MetadataError::TagMissing {
                tags: vec!["duration".to_string()],
            })?;
        validate_duration(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_recorded_files() {
        let dt = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap();
        let mut provider = StaticMetadataProvider::new();
        provider.insert("/a.MTS", dt, 4.0);

        assert_eq!(provider.capture_datetime(Path::new("/a.MTS")).unwrap(), dt);
        assert_eq!(provider.duration_seconds(Path::new("/a.MTS")).unwrap(), 4.0);
        assert!(matches!(
            provider.capture_datetime(Path::new("/b.MTS")),
            Err(MetadataError::NotFound)
        ));
    }

    #[test]
    fn missing_datetime_is_tag_missing() {
        let mut provider = StaticMetadataProvider::new();
        provider.insert_without_datetime("/a.MTS", 4.0);
        assert!(matches!(
            provider.capture_datetime(Path::new("/a.MTS")),
            Err(MetadataError::TagMissing { .. })
        ));
    }
}
