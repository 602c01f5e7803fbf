//! Computes secondary cut windows that follow the base angle's cut points.

use crate::group::ClipGroup;
use crate::models::{Clip, RecutEntry, RecutPadding, RecutPlan};

/// Plan one secondary cut (or a blank) per base clip.
pub fn plan_recut(base: &ClipGroup, secondary: &ClipGroup, padding: &RecutPadding) -> RecutPlan {
    let entries = plan_entries(base.clips(), secondary.clips(), padding);
    RecutPlan {
        base_paths: base.iter().map(|c| c.file_path.clone()).collect(),
        entries,
    }
}

/// Plan entries for sorted base and secondary sequences.
///
/// The secondary cursor only moves forward: secondary clips that end before
/// a base clip starts can never cover a later base clip either.
pub fn plan_entries(base: &[Clip], secondary: &[Clip], padding: &RecutPadding) -> Vec<RecutEntry> {
    let mut entries = Vec::with_capacity(base.len());
    let mut j = 0;

    for b in base {
        while j < secondary.len() && b.sync_time > secondary[j].end_time() {
            j += 1;
        }

        let entry = match secondary.get(j) {
            None => RecutEntry::Blank,
            Some(s) if b.end_time() < s.sync_time => RecutEntry::Blank,
            Some(s) if s.sync_time < b.sync_time && s.end_time() > b.sync_time => {
                RecutEntry::Extract {
                    source_path: s.file_path.clone(),
                    extract_start: 0.0,
                    extract_duration: b.end_time() - s.sync_time + padding.trailing_pad,
                }
            }
            Some(s) => RecutEntry::Extract {
                source_path: s.file_path.clone(),
                extract_start: (b.sync_time - s.sync_time - padding.lead_pad).max(0.0),
                extract_duration: b.duration_seconds + padding.window_pad,
            },
        };

        tracing::trace!("Recut {} -> {:?}", b.file_name(), entry);
        entries.push(entry);
    }

    entries
}
