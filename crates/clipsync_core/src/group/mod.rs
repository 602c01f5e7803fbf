//! Clip groups: one camera angle's clips on a shared relative timeline.
//!
//! Building a group runs a fixed sequence of passes:
//!
//! ```text
//! scan_directory -> with_datetime -> with_duration -> with_synchronized_time -> sort
//! ```
//!
//! The reference clip is addressed by its index in the directory scan (file
//! name order). Its sync time is exactly `-offset`, so the offset is the
//! number of seconds into the reference clip where a shared event happens.

mod passes;
mod scan;

use std::path::{Path, PathBuf};

use crate::error::{SyncError, SyncResult};
use crate::metadata::MetadataProvider;
use crate::models::Clip;

pub use passes::{seconds_between, with_datetime, with_duration, with_synchronized_time};
pub use scan::{scan_directory, MediaFilter, DEFAULT_EXTENSIONS};

/// Clips from one directory, sorted ascending by sync time.
///
/// Ties keep directory scan order. The reference index and offset are fixed
/// at construction.
#[derive(Debug, Clone)]
pub struct ClipGroup {
    directory: PathBuf,
    reference_index: usize,
    offset: i64,
    clips: Vec<Clip>,
}

impl ClipGroup {
    /// Scan `directory`, resolve metadata, and place every clip on the
    /// timeline of the clip at `reference_index`.
    pub fn build(
        directory: impl AsRef<Path>,
        filter: &MediaFilter,
        provider: &dyn MetadataProvider,
        reference_index: usize,
        offset: i64,
    ) -> SyncResult<Self> {
        let directory = directory.as_ref();
        let candidates = scan_directory(directory, filter)?;

        if candidates.is_empty() {
            return Err(SyncError::EmptyClipGroup {
                directory: directory.to_path_buf(),
            });
        }
        if reference_index >= candidates.len() {
            return Err(SyncError::IndexOutOfRange {
                directory: directory.to_path_buf(),
                index: reference_index,
                count: candidates.len(),
            });
        }

        let paths: Vec<PathBuf> = candidates.iter().map(|c| c.file_path.clone()).collect();
        if let Err(e) = provider.prefetch(&paths) {
            tracing::warn!(
                "Batch metadata read failed for {}: {}; reading files one by one",
                directory.display(),
                e
            );
        }

        let timed = with_datetime(&candidates, provider)?;
        let sized = with_duration(&timed, provider)?;

        let reference_datetime = sized[reference_index]
            .capture_datetime
            .ok_or_else(|| SyncError::IndexOutOfRange {
                directory: directory.to_path_buf(),
                index: reference_index,
                count: sized.len(),
            })?;

        let clips = with_synchronized_time(&sized, reference_datetime, offset)?;
        let group = Self::from_clips(directory, reference_index, offset, clips);

        tracing::info!(
            "Loaded {} clips from {} (reference #{}, offset {}s)",
            group.len(),
            directory.display(),
            reference_index,
            offset
        );

        Ok(group)
    }

    /// Assemble a group from already-placed clips, sorting them.
    pub fn from_clips(
        directory: impl Into<PathBuf>,
        reference_index: usize,
        offset: i64,
        mut clips: Vec<Clip>,
    ) -> Self {
        clips.sort_by(|a, b| a.sync_time.total_cmp(&b.sync_time));
        Self {
            directory: directory.into(),
            reference_index,
            offset,
            clips,
        }
    }

    /// Directory the clips were scanned from.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Scan index of the reference clip.
    pub fn reference_index(&self) -> usize {
        self.reference_index
    }

    /// Manual correction applied to every sync time.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// The reference clip, if it is part of this group.
    pub fn reference_clip(&self) -> Option<&Clip> {
        self.clips
            .iter()
            .find(|c| c.scan_index == self.reference_index)
    }

    /// Clips in timeline order.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Number of clips.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Whether the group has no clips.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Iterate clips in timeline order.
    pub fn iter(&self) -> std::slice::Iter<'_, Clip> {
        self.clips.iter()
    }
}

impl<'a> IntoIterator for &'a ClipGroup {
    type Item = &'a Clip;
    type IntoIter = std::slice::Iter<'a, Clip>;

    fn into_iter(self) -> Self::IntoIter {
        self.clips.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::StaticMetadataProvider;
    use chrono::{DateTime, FixedOffset};
    use std::fs;
    use tempfile::tempdir;

    fn dt(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    /// Files named in scan order, recorded out of chronological order.
    fn fixture() -> (tempfile::TempDir, StaticMetadataProvider) {
        let dir = tempdir().unwrap();
        let mut provider = StaticMetadataProvider::new();
        let rows = [
            ("00001.MTS", "2024-01-01T10:05:00Z", 20.0),
            ("00002.MTS", "2024-01-01T10:00:00Z", 60.0),
            ("00003.MP4", "2024-01-01T10:02:00Z", 30.0),
            ("00004.mts", "2024-01-01T10:02:00Z", 5.0),
        ];
        for (name, when, duration) in rows {
            let path = dir.path().join(name);
            fs::write(&path, b"x").unwrap();
            provider.insert(path, dt(when), duration);
        }
        fs::write(dir.path().join("readme.txt"), b"x").unwrap();
        (dir, provider)
    }

    #[test]
    fn build_sorts_by_sync_time() {
        let (dir, provider) = fixture();
        let group = ClipGroup::build(dir.path(), &MediaFilter::default(), &provider, 0, 0).unwrap();

        assert_eq!(group.len(), 4);
        let times: Vec<f64> = group.iter().map(|c| c.sync_time).collect();
        assert_eq!(times, vec![-300.0, -180.0, -180.0, 0.0]);
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn ties_keep_scan_order() {
        let (dir, provider) = fixture();
        let group = ClipGroup::build(dir.path(), &MediaFilter::default(), &provider, 1, 0).unwrap();
        assert_eq!(group.clips()[1].file_name(), "00003.MP4");
        assert_eq!(group.clips()[2].file_name(), "00004.mts");
    }

    #[test]
    fn reference_clip_sits_at_minus_offset() {
        let (dir, provider) = fixture();
        let group = ClipGroup::build(dir.path(), &MediaFilter::default(), &provider, 2, 7).unwrap();
        let reference = group.reference_clip().unwrap();
        assert_eq!(reference.file_name(), "00003.MP4");
        assert_eq!(reference.sync_time, -7.0);
        assert_eq!(group.offset(), 7);
    }

    #[test]
    fn empty_directory_fails() {
        let dir = tempdir().unwrap();
        let err = ClipGroup::build(
            dir.path(),
            &MediaFilter::default(),
            &StaticMetadataProvider::new(),
            0,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::EmptyClipGroup { .. }));
    }

    #[test]
    fn reference_index_must_exist() {
        let (dir, provider) = fixture();
        let err = ClipGroup::build(dir.path(), &MediaFilter::default(), &provider, 4, 0)
            .unwrap_err();
        match err {
            SyncError::IndexOutOfRange { index, count, .. } => {
                assert_eq!(index, 4);
                assert_eq!(count, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unresolvable_timestamp_aborts_group() {
        let (dir, mut provider) = fixture();
        provider.insert_without_datetime(dir.path().join("00002.MTS"), 60.0);
        let err = ClipGroup::build(dir.path(), &MediaFilter::default(), &provider, 0, 0)
            .unwrap_err();
        assert!(matches!(err, SyncError::MetadataUnavailable { .. }));
        assert!(err.path().ends_with("00002.MTS"));
    }
}
