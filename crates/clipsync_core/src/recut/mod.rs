//! Recutting the secondary angle to the base angle's cut points.
//!
//! The planner walks base clips in timeline order with a forward-only cursor
//! into the secondary clips, and produces one [`RecutEntry`] per base clip:
//!
//! - **Blank**: no secondary clip covers the base clip's window
//! - **Extract from start**: the secondary clip started before the base clip,
//!   so cut from its start up to the base clip's end plus `trailing_pad`
//! - **Extract window**: otherwise cut `lead_pad` before the base clip's start
//!   for the base duration plus `window_pad`
//!
//! ```text
//! secondary: [======s======]
//! base:          [==b==]
//! cut:       [===========]+pad   (extract from start)
//! ```
//!
//! Cutting itself happens in a [`TrimExecutor`]; entries reference the
//! untrimmed secondary file.
//!
//! [`RecutEntry`]: crate::models::RecutEntry

mod executor;
mod planner;

pub use executor::{
    execute_recut, format_ffmpeg_timestamp, FfmpegTrimExecutor, RecutOutput, RecutReport,
    TrimExecutor,
};
pub use planner::{plan_entries, plan_recut};

#[cfg(test)]
pub(crate) use executor::testing;
