//! Pure transformation passes over clip sequences.
//!
//! Each pass takes a sequence and returns a new one; inputs are never
//! modified, so every stage can be replayed on its own.

use chrono::{DateTime, FixedOffset};

use crate::error::{SyncError, SyncResult};
use crate::metadata::{MetadataError, MetadataProvider};
use crate::models::{Clip, ClipCandidate};

/// Attach capture timestamps.
pub fn with_datetime(
    candidates: &[ClipCandidate],
    provider: &dyn MetadataProvider,
) -> SyncResult<Vec<ClipCandidate>> {
    candidates
        .iter()
        .map(|candidate| {
            let datetime = provider
                .capture_datetime(&candidate.file_path)
                .map_err(|e| SyncError::metadata_unavailable(&candidate.file_path, e))?;
            Ok(candidate.clone().with_capture_datetime(datetime))
        })
        .collect()
}

/// Attach durations.
pub fn with_duration(
    candidates: &[ClipCandidate],
    provider: &dyn MetadataProvider,
) -> SyncResult<Vec<ClipCandidate>> {
    candidates
        .iter()
        .map(|candidate| {
            let duration = provider
                .duration_seconds(&candidate.file_path)
                .map_err(|e| SyncError::metadata_unavailable(&candidate.file_path, e))?;
            Ok(candidate.clone().with_duration_seconds(duration))
        })
        .collect()
}

/// Seconds from `reference` to `datetime`.
pub fn seconds_between(reference: DateTime<FixedOffset>, datetime: DateTime<FixedOffset>) -> f64 {
    let delta = datetime.signed_duration_since(reference);
    delta.num_milliseconds() as f64 / 1000.0
}

/// Place candidates on the timeline of `reference`, shifted by `offset`.
///
/// `sync_time = (capture_datetime - reference_datetime) - offset`. Order is
/// preserved; sorting is the caller's concern.
pub fn with_synchronized_time(
    candidates: &[ClipCandidate],
    reference_datetime: DateTime<FixedOffset>,
    offset: i64,
) -> SyncResult<Vec<Clip>> {
    candidates
        .iter()
        .map(|candidate| {
            let capture_datetime = candidate.capture_datetime.ok_or_else(|| {
                SyncError::metadata_unavailable(
                    &candidate.file_path,
                    MetadataError::TagMissing {
                        tags: vec!["capture_datetime".to_string()],
                    },
                )
            })?;
            let duration_seconds = candidate.duration_seconds.ok_or_else(|| {
                SyncError::metadata_unavailable(
                    &candidate.file_path,
                    MetadataError::TagMissing {
                        tags: vec!["duration".to_string()],
                    },
                )
            })?;

            Ok(Clip {
                file_path: candidate.file_path.clone(),
                scan_index: candidate.scan_index,
                capture_datetime,
                duration_seconds,
                sync_time: seconds_between(reference_datetime, capture_datetime) - offset as f64,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::StaticMetadataProvider;

    fn dt(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn provider() -> StaticMetadataProvider {
        let mut p = StaticMetadataProvider::new();
        p.insert("/w/1.MTS", dt("2024-01-01T10:00:00Z"), 30.0);
        p.insert("/w/2.MTS", dt("2024-01-01T10:01:00Z"), 15.5);
        p
    }

    fn candidates() -> Vec<ClipCandidate> {
        vec![ClipCandidate::new("/w/1.MTS", 0), ClipCandidate::new("/w/2.MTS", 1)]
    }

    #[test]
    fn passes_do_not_touch_input() {
        let input = candidates();
        let timed = with_datetime(&input, &provider()).unwrap();
        assert!(input.iter().all(|c| c.capture_datetime.is_none()));
        assert!(timed.iter().all(|c| c.capture_datetime.is_some()));

        let sized = with_duration(&timed, &provider()).unwrap();
        assert!(timed.iter().all(|c| c.duration_seconds.is_none()));
        assert_eq!(sized[1].duration_seconds, Some(15.5));
    }

    #[test]
    fn sync_time_is_relative_minus_offset() {
        let p = provider();
        let full = with_duration(&with_datetime(&candidates(), &p).unwrap(), &p).unwrap();
        let clips = with_synchronized_time(&full, dt("2024-01-01T10:00:00Z"), 10).unwrap();
        assert_eq!(clips[0].sync_time, -10.0);
        assert_eq!(clips[1].sync_time, 50.0);
    }

    #[test]
    fn span_over_a_day_counts_fully() {
        let a = dt("2024-01-01T23:59:50Z");
        let b = dt("2024-01-03T00:00:10Z");
        assert_eq!(seconds_between(a, b), 86_420.0);
    }

    #[test]
    fn unknown_file_is_metadata_unavailable() {
        let err = with_datetime(&[ClipCandidate::new("/w/9.MTS", 0)], &provider()).unwrap_err();
        assert!(matches!(err, SyncError::MetadataUnavailable { .. }));
        assert!(err.to_string().contains("/w/9.MTS"));
    }

    #[test]
    fn unresolved_candidate_cannot_be_placed() {
        let err = with_synchronized_time(&candidates(), dt("2024-01-01T10:00:00Z"), 0)
            .unwrap_err();
        assert!(matches!(err, SyncError::MetadataUnavailable { .. }));
    }
}
