//! Data models for clipsync.
//!
//! This module contains the core data structures shared by every pass:
//! - Clip candidates and placed clips
//! - Matched pairs produced by the synchronizer
//! - Recut plans and their padding
//! - Materialization modes

mod clip;
mod enums;
mod timeline;

#[cfg(test)]
pub(crate) use clip::fixtures;

// Re-export all public types
pub use clip::{Clip, ClipCandidate};
pub use enums::MaterializeMode;
pub use timeline::{MatchedPair, RecutEntry, RecutPadding, RecutPlan};
