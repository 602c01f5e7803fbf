//! Writes a merged timeline back to disk as two index-aligned clip sets.
//!
//! Slot `n` of the timeline becomes file `<token n>` in both angle
//! directories. A side with no footage in that slot gets a copy of the
//! blank filler clip instead, so both directories end up with the same
//! number of entries and matching tokens:
//!
//! ```text
//! pairs:      (a, x)   (-, y)   (c, -)
//! base:       0001.MTS 0002.mp4 0003.MTS     (0002 is blank)
//! secondary:  0001.MTS 0002.MTS 0003.mp4     (0003 is blank)
//! ```
//!
//! # Modes
//!
//! - [`MaterializeMode::RenameAndPad`] renames clips in place. It is not
//!   idempotent: a second run finds the original names gone and fails with
//!   [`SyncError::ClipMissing`].
//! - [`MaterializeMode::Copy`] copies into an `output` subdirectory and
//!   leaves originals untouched. Slot files left there by an earlier run are
//!   removed first, so the subdirectory holds exactly one file per slot and
//!   re-running with the same pairs writes the same content.
//!
//! Neither mode is crash-atomic; an interrupted run leaves a partially
//! written directory.

mod naming;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{SyncError, SyncResult};
use crate::models::{Clip, MatchedPair, MaterializeMode};

pub use naming::SequenceNamer;

/// Default name of the subdirectory written by copy mode.
pub const DEFAULT_OUTPUT_SUBDIR: &str = "output";

/// Settings for one materialization pass.
#[derive(Debug, Clone, Copy)]
pub struct MaterializeOptions<'a> {
    /// Rename in place or copy to the output subdirectory.
    pub mode: MaterializeMode,
    /// Slot naming scheme.
    pub namer: &'a SequenceNamer,
    /// Placeholder clip copied into empty slots.
    pub blank_source: &'a Path,
    /// Subdirectory name used by copy mode.
    pub output_subdir: &'a str,
}

/// Summary of a materialization pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaterializeReport {
    /// Number of timeline slots written per angle.
    pub slots: usize,
    /// Slots where both angles have footage.
    pub paired: usize,
    /// Slots padded on the secondary side.
    pub base_only: usize,
    /// Slots padded on the base side.
    pub secondary_only: usize,
    /// Directory holding the aligned base set.
    pub base_target: PathBuf,
    /// Directory holding the aligned secondary set.
    pub secondary_target: PathBuf,
}

/// Write `pairs` into the base and secondary directories.
pub fn materialize(
    pairs: &[MatchedPair],
    base_directory: &Path,
    secondary_directory: &Path,
    options: &MaterializeOptions<'_>,
) -> SyncResult<MaterializeReport> {
    let needs_blank = pairs
        .iter()
        .any(|p| p.base.is_none() || p.secondary.is_none());
    if needs_blank && !options.blank_source.is_file() {
        return Err(SyncError::BlankSourceMissing {
            path: options.blank_source.to_path_buf(),
        });
    }

    let mut report = MaterializeReport {
        slots: pairs.len(),
        base_target: target_dir(base_directory, options),
        secondary_target: target_dir(secondary_directory, options),
        ..Default::default()
    };

    tracing::info!(
        "Materializing {} slots ({}) into {} and {}",
        pairs.len(),
        options.mode,
        report.base_target.display(),
        report.secondary_target.display()
    );

    if options.mode.uses_output_dir() {
        clear_stale_slots(&report.base_target, options.namer)?;
        clear_stale_slots(&report.secondary_target, options.namer)?;
    }

    for (idx, pair) in pairs.iter().enumerate() {
        let slot = idx + 1;
        place(pair.base.as_ref(), slot, base_directory, options)?;
        place(pair.secondary.as_ref(), slot, secondary_directory, options)?;

        match (&pair.base, &pair.secondary) {
            (Some(_), Some(_)) => report.paired += 1,
            (Some(_), None) => report.base_only += 1,
            (None, Some(_)) => report.secondary_only += 1,
            (None, None) => {}
        }
    }

    Ok(report)
}

/// Directory a mode writes into for an angle directory.
fn target_dir(directory: &Path, options: &MaterializeOptions<'_>) -> PathBuf {
    if options.mode.uses_output_dir() {
        directory.join(options.output_subdir)
    } else {
        directory.to_path_buf()
    }
}

/// Put one side of a slot in place: the clip itself, or a blank.
fn place(
    clip: Option<&Clip>,
    slot: usize,
    angle_directory: &Path,
    options: &MaterializeOptions<'_>,
) -> SyncResult<()> {
    match clip {
        Some(clip) => place_clip(clip, slot, options),
        None => place_blank(slot, angle_directory, options),
    }
}

fn place_clip(clip: &Clip, slot: usize, options: &MaterializeOptions<'_>) -> SyncResult<()> {
    let source = clip.path();
    if !source.is_file() {
        return Err(SyncError::ClipMissing {
            path: source.to_path_buf(),
        });
    }

    let own_directory = source.parent().unwrap_or_else(|| Path::new("."));
    let name = options.namer.clip_name(slot, source);

    match options.mode {
        MaterializeMode::RenameAndPad => {
            let destination = own_directory.join(&name);
            if destination == source {
                return Ok(());
            }
            if destination.exists() {
                return Err(SyncError::RenameCollision {
                    from: source.to_path_buf(),
                    to: destination,
                });
            }
            tracing::debug!("Renaming {} -> {}", source.display(), destination.display());
            fs::rename(source, &destination).map_err(|e| SyncError::unwritable(&destination, e))
        }
        MaterializeMode::Copy => {
            let directory = ensure_dir(&own_directory.join(options.output_subdir))?;
            let destination = directory.join(&name);
            tracing::debug!("Copying {} -> {}", source.display(), destination.display());
            fs::copy(source, &destination)
                .map(|_| ())
                .map_err(|e| SyncError::unwritable(&destination, e))
        }
    }
}

fn place_blank(
    slot: usize,
    angle_directory: &Path,
    options: &MaterializeOptions<'_>,
) -> SyncResult<()> {
    let directory = ensure_dir(&target_dir(angle_directory, options))?;
    let destination = directory.join(options.namer.blank_name(slot));

    // Rename mode shares the directory with original footage.
    if options.mode == MaterializeMode::RenameAndPad && destination.exists() {
        return Err(SyncError::RenameCollision {
            from: options.blank_source.to_path_buf(),
            to: destination,
        });
    }

    tracing::debug!("Blank filler -> {}", destination.display());
    fs::copy(options.blank_source, &destination)
        .map(|_| ())
        .map_err(|e| SyncError::unwritable(&destination, e))
}

/// Remove slot files from an output directory before it is rewritten.
///
/// Only names `namer` could have produced are touched; a missing directory
/// counts as empty. Returns the number of files removed.
pub fn clear_stale_slots(directory: &Path, namer: &SequenceNamer) -> SyncResult<usize> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(SyncError::unwritable(directory, e)),
    };

    let mut removed = 0;
    for entry in entries {
        let path = entry.map_err(|e| SyncError::unwritable(directory, e))?.path();
        let is_slot = path
            .file_name()
            .map_or(false, |name| namer.is_slot_name(&name.to_string_lossy()));
        if is_slot && path.is_file() {
            fs::remove_file(&path).map_err(|e| SyncError::unwritable(&path, e))?;
            removed += 1;
        }
    }

    if removed > 0 {
        tracing::debug!("Removed {} stale slot files from {}", removed, directory.display());
    }
    Ok(removed)
}

fn ensure_dir(directory: &Path) -> SyncResult<PathBuf> {
    fs::create_dir_all(directory).map_err(|e| SyncError::unwritable(directory, e))?;
    Ok(directory.to_path_buf())
}
