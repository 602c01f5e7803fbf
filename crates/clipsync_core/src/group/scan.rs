//! Directory scanning for supported media files.

use std::fs;
use std::path::Path;

use crate::error::{SyncError, SyncResult};
use crate::models::ClipCandidate;

/// Default media extensions recognized in clip directories.
pub const DEFAULT_EXTENSIONS: &[&str] = &["MTS", "MP4"];

/// Extension allow-list, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFilter {
    extensions: Vec<String>,
}

impl MediaFilter {
    /// Build a filter from extensions, with or without a leading dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_uppercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Normalized (upper-case, no dot) extensions.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether the path has an allowed extension.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_uppercase())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
    }
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

/// List supported media files directly inside `directory`.
///
/// Subdirectories are not descended into, so a previous run's `output`
/// folder is never picked up. Candidates come back in file name order,
/// which fixes `scan_index` and the tie-break order for equal sync times.
pub fn scan_directory(directory: &Path, filter: &MediaFilter) -> SyncResult<Vec<ClipCandidate>> {
    let scan_err = |source| SyncError::ScanFailed {
        directory: directory.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(directory).map_err(scan_err)? {
        let entry = entry.map_err(scan_err)?;
        let path = entry.path();
        if path.is_file() && filter.matches(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    tracing::debug!(
        "Found {} media files in {}",
        paths.len(),
        directory.display()
    );

    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| ClipCandidate::new(path, index))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn filter_is_case_insensitive() {
        let filter = MediaFilter::new([".mts", "Mp4"]);
        assert!(filter.matches(Path::new("/a/00001.MTS")));
        assert!(filter.matches(Path::new("/a/clip.mp4")));
        assert!(!filter.matches(Path::new("/a/clip.mov")));
        assert!(!filter.matches(Path::new("/a/MTS")));
    }

    #[test]
    fn scan_returns_sorted_media_only() {
        let dir = tempdir().unwrap();
        for name in ["00003.MTS", "00001.mts", "notes.txt", "00002.MP4"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("output.mp4")).unwrap();

        let candidates = scan_directory(dir.path(), &MediaFilter::default()).unwrap();
        let names: Vec<_> = candidates
            .iter()
            .map(|c| c.file_path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["00001.mts", "00002.MP4", "00003.MTS"]);
        assert_eq!(candidates[2].scan_index, 2);
        assert!(candidates.iter().all(|c| c.capture_datetime.is_none()));
    }

    #[test]
    fn missing_directory_fails() {
        let err = scan_directory(Path::new("/nonexistent/clips"), &MediaFilter::default())
            .unwrap_err();
        assert!(matches!(err, SyncError::ScanFailed { .. }));
    }
}
