//! clipsync core - aligning footage from two cameras by capture time
//!
//! This crate contains all synchronization logic with zero UI dependencies:
//! building clip groups from folders, merging two groups into one timeline,
//! writing index-aligned folders, and recutting the secondary angle to the
//! base angle's cut points. Metadata reading and media trimming sit behind
//! traits so the external tools can be swapped out.

pub mod config;
pub mod error;
pub mod group;
pub mod logging;
pub mod materialize;
pub mod metadata;
pub mod models;
pub mod recut;
pub mod session;
pub mod sync;

pub use error::{SyncError, SyncResult};
pub use group::ClipGroup;
pub use session::{AngleSelection, MatchReport, SyncSession};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
