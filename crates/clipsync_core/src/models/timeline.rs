//! Output structures: matched pairs, recut plans, and padding.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::clip::Clip;

/// One slot of the merged two-angle timeline.
///
/// At least one side is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    /// Clip from the base angle.
    pub base: Option<Clip>,
    /// Clip from the secondary angle.
    pub secondary: Option<Clip>,
}

impl MatchedPair {
    /// Both angles recorded during this slot.
    pub fn paired(base: Clip, secondary: Clip) -> Self {
        Self {
            base: Some(base),
            secondary: Some(secondary),
        }
    }

    /// Only the base angle recorded during this slot.
    pub fn base_only(base: Clip) -> Self {
        Self {
            base: Some(base),
            secondary: None,
        }
    }

    /// Only the secondary angle recorded during this slot.
    pub fn secondary_only(secondary: Clip) -> Self {
        Self {
            base: None,
            secondary: Some(secondary),
        }
    }

    /// Whether both sides are present.
    pub fn is_paired(&self) -> bool {
        self.base.is_some() && self.secondary.is_some()
    }

    /// Earliest sync time among the present sides.
    pub fn start_time(&self) -> f64 {
        match (&self.base, &self.secondary) {
            (Some(b), Some(s)) => b.sync_time.min(s.sync_time),
            (Some(b), None) => b.sync_time,
            (None, Some(s)) => s.sync_time,
            (None, None) => f64::NAN,
        }
    }
}

/// Trim parameters for one base clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecutEntry {
    /// No secondary footage covers this base clip.
    Blank,
    /// Cut `[extract_start, extract_start + extract_duration]` out of the
    /// untrimmed secondary clip.
    Extract {
        source_path: PathBuf,
        extract_start: f64,
        extract_duration: f64,
    },
}

impl RecutEntry {
    /// Whether this entry is a blank filler.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }
}

/// A recut plan: one entry per base clip, in base timeline order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecutPlan {
    /// Base clip each entry is cut for.
    pub base_paths: Vec<PathBuf>,
    /// Trim parameters, parallel to `base_paths`.
    pub entries: Vec<RecutEntry>,
}

impl RecutPlan {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the plan has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of blank fillers in the plan.
    pub fn blank_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_blank()).count()
    }
}

/// Safety margins (seconds) applied around recut windows.
///
/// Capture timestamps and container durations are rounded, so cuts are
/// widened to never under-cover a base clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecutPadding {
    /// Added past the base clip's end when the secondary clip started first.
    pub trailing_pad: f64,
    /// Taken off the start when cutting from inside a secondary clip.
    pub lead_pad: f64,
    /// Added to the base duration when cutting from inside a secondary clip.
    pub window_pad: f64,
}

impl Default for RecutPadding {
    fn default() -> Self {
        Self {
            trailing_pad: 1.0,
            lead_pad: 1.0,
            window_pad: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::clip::fixtures::clip;

    #[test]
    fn start_time_takes_earliest_side() {
        let pair = MatchedPair::paired(clip("b", 3.0, 5.0), clip("s", 1.0, 5.0));
        assert_eq!(pair.start_time(), 1.0);
        assert!(pair.is_paired());
        assert!(!MatchedPair::base_only(clip("b", 0.0, 1.0)).is_paired());
    }

    #[test]
    fn entry_serializes_with_kind_tag() {
        let entry = RecutEntry::Extract {
            source_path: PathBuf::from("s.MTS"),
            extract_start: 0.0,
            extract_duration: 8.0,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "extract");
        assert_eq!(json["extract_duration"], 8.0);

        let blank = serde_json::to_value(&RecutEntry::Blank).unwrap();
        assert_eq!(blank["kind"], "blank");
    }

    #[test]
    fn plan_counts_blanks() {
        let plan = RecutPlan {
            base_paths: vec![PathBuf::from("a"), PathBuf::from("b")],
            entries: vec![
                RecutEntry::Blank,
                RecutEntry::Extract {
                    source_path: PathBuf::from("s"),
                    extract_start: 1.0,
                    extract_duration: 4.0,
                },
            ],
        };
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.blank_count(), 1);
    }
}
