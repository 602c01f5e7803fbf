//! Interval synchronization of two clip groups.
//!
//! Walks both groups with one pointer each and emits one [`MatchedPair`] per
//! step:
//!
//! ```text
//! base:       [=====a=====]          [==c==]
//! secondary:       [====x====] [=y=]
//! pairs:      (a, x)  (-, y)  (c, -)
//! ```
//!
//! Overlapping clips are paired greedily one-to-one; everything else is
//! emitted alone, earliest first. When two non-overlapping clips start at the
//! same time (only possible with zero-length clips) the base clip goes first.

use crate::group::ClipGroup;
use crate::models::{Clip, MatchedPair};

/// Whether two clips share any stretch of the timeline.
///
/// The shared stretch must have positive length: clips that merely touch do
/// not overlap, and neither does a zero-length clip, wherever it sits.
pub fn clips_overlap(a: &Clip, b: &Clip) -> bool {
    let start = a.sync_time.max(b.sync_time);
    let end = (a.sync_time + a.duration_seconds).min(b.sync_time + b.duration_seconds);
    end > start
}

/// Merge two groups into a single timeline of matched pairs.
pub fn merge(base: &ClipGroup, secondary: &ClipGroup) -> Vec<MatchedPair> {
    merge_clips(base.clips(), secondary.clips())
}

/// Merge two sequences already sorted by sync time.
pub fn merge_clips(base: &[Clip], secondary: &[Clip]) -> Vec<MatchedPair> {
    let mut pairs = Vec::with_capacity(base.len().max(secondary.len()));
    let (mut i, mut j) = (0, 0);

    while i < base.len() || j < secondary.len() {
        let pair = match (base.get(i), secondary.get(j)) {
            (None, Some(s)) => {
                j += 1;
                MatchedPair::secondary_only(s.clone())
            }
            (Some(b), None) => {
                i += 1;
                MatchedPair::base_only(b.clone())
            }
            (Some(b), Some(s)) if clips_overlap(b, s) => {
                i += 1;
                j += 1;
                MatchedPair::paired(b.clone(), s.clone())
            }
            (Some(b), Some(s)) if b.sync_time <= s.sync_time => {
                i += 1;
                MatchedPair::base_only(b.clone())
            }
            (Some(_), Some(s)) => {
                j += 1;
                MatchedPair::secondary_only(s.clone())
            }
            (None, None) => break,
        };
        pairs.push(pair);
    }

    tracing::debug!(
        "Merged {} base and {} secondary clips into {} slots ({} paired)",
        base.len(),
        secondary.len(),
        pairs.len(),
        pairs.iter().filter(|p| p.is_paired()).count()
    );

    pairs
}
