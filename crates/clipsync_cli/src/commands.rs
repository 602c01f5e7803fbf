//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

use clipsync_core::config::{ConfigManager, Settings};
use clipsync_core::logging::{default_run_name, RunLogger};
use clipsync_core::models::{Clip, MatchedPair, MaterializeMode, RecutEntry, RecutPlan};
use clipsync_core::{AngleSelection, ClipGroup, SyncSession};

use super::AngleArgs;

/// `clipsync scan`
pub fn scan(
    config: &ConfigManager,
    dir: &Path,
    reference: usize,
    offset: i64,
    json: bool,
) -> anyhow::Result<()> {
    let settings = config.settings();
    let provider = settings.scan.tool_provider();
    let group = ClipGroup::build(
        dir,
        &settings.scan.media_filter(),
        &provider,
        reference,
        offset,
    )?;

    if json {
        return print_json(group.clips());
    }

    println!(
        "{} clips in {} (reference #{}, offset {}s)",
        group.len(),
        dir.display(),
        reference,
        offset
    );
    println!(
        "{:>4}  {:<24} {:<26} {:>10} {:>10}",
        "#", "file", "captured", "duration", "sync"
    );
    for clip in &group {
        println!(
            "{:>4}  {:<24} {:<26} {:>10.3} {:>10.3}",
            clip.scan_index,
            clip.file_name(),
            clip.capture_datetime.to_rfc3339(),
            clip.duration_seconds,
            clip.sync_time
        );
    }
    Ok(())
}

/// `clipsync match`
pub fn run_match(
    config: &mut ConfigManager,
    angles: &AngleArgs,
    mode: MaterializeMode,
    blank: Option<PathBuf>,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let settings = session_settings(config, blank);
    let provider = settings.scan.tool_provider();
    let mut session = SyncSession::new(base_selection(angles), secondary_selection(angles), settings);

    if dry_run {
        let pairs = session.match_pairs(&provider)?;
        if json {
            return print_json(&pairs);
        }
        print_pairs(&pairs);
        return Ok(());
    }

    if let Some(logger) = open_run_logger(config, angles) {
        session = session.with_logger(logger);
    }

    let report = session.match_folders(&provider, mode)?;
    remember(config, angles);

    if json {
        return print_json(&report);
    }
    println!(
        "{} slots: {} paired, {} base only, {} secondary only",
        report.materialized.slots,
        report.materialized.paired,
        report.materialized.base_only,
        report.materialized.secondary_only
    );
    println!("base:      {}", report.materialized.base_target.display());
    println!("secondary: {}", report.materialized.secondary_target.display());
    Ok(())
}

/// `clipsync recut`
pub fn run_recut(
    config: &mut ConfigManager,
    angles: &AngleArgs,
    blank: Option<PathBuf>,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let settings = session_settings(config, blank);
    let provider = settings.scan.tool_provider();
    let mut executor = settings.recut.ffmpeg_executor();
    let mut session = SyncSession::new(base_selection(angles), secondary_selection(angles), settings);

    if dry_run {
        let plan = session.plan_recut(&provider)?;
        if json {
            return print_json(&plan);
        }
        print_plan(&plan);
        return Ok(());
    }

    if let Some(logger) = open_run_logger(config, angles) {
        executor = executor.with_logger(logger.clone());
        session = session.with_logger(logger);
    }

    let report = session.recut_secondary(&provider, &executor)?;
    remember(config, angles);

    if json {
        return print_json(&report);
    }
    println!(
        "{} segments and {} blanks written to {}",
        report.extracted,
        report.blanks,
        report.target.display()
    );
    Ok(())
}

fn base_selection(angles: &AngleArgs) -> AngleSelection {
    AngleSelection::new(&angles.base, angles.base_ref, angles.base_offset)
}

fn secondary_selection(angles: &AngleArgs) -> AngleSelection {
    AngleSelection::new(
        &angles.secondary,
        angles.secondary_ref,
        angles.secondary_offset,
    )
}

/// Settings for this run with command-line overrides applied.
fn session_settings(config: &ConfigManager, blank: Option<PathBuf>) -> Settings {
    let mut settings = config.settings().clone();
    if let Some(blank) = blank {
        settings.paths.blank_source = blank.display().to_string();
    }
    settings
}

fn open_run_logger(config: &ConfigManager, angles: &AngleArgs) -> Option<Arc<RunLogger>> {
    let name = default_run_name(&angles.base, &angles.secondary);
    match RunLogger::new(
        name,
        config.logs_folder(),
        config.settings().logging.log_config(),
        None,
    ) {
        Ok(logger) => {
            tracing::debug!("Run log: {}", logger.log_path().display());
            Some(Arc::new(logger))
        }
        Err(e) => {
            tracing::warn!("Cannot open run log: {}", e);
            None
        }
    }
}

fn remember(config: &mut ConfigManager, angles: &AngleArgs) {
    if let Err(e) = config.remember_angles(&angles.base, &angles.secondary) {
        tracing::warn!("Cannot save last used folders: {}", e);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("encoding JSON output")?;
    println!("{}", text);
    Ok(())
}

fn print_pairs(pairs: &[MatchedPair]) {
    let side = |clip: &Option<Clip>| {
        clip.as_ref()
            .map(|c| format!("{} @{:.1}", c.file_name(), c.sync_time))
            .unwrap_or_else(|| "-".to_string())
    };
    println!("{:>4}  {:<32} {}", "slot", "base", "secondary");
    for (idx, pair) in pairs.iter().enumerate() {
        println!(
            "{:>4}  {:<32} {}",
            idx + 1,
            side(&pair.base),
            side(&pair.secondary)
        );
    }
}

fn print_plan(plan: &RecutPlan) {
    println!("{:>4}  {:<24} {}", "slot", "base", "secondary cut");
    for (idx, (base, entry)) in plan.base_paths.iter().zip(&plan.entries).enumerate() {
        let base_name = base
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let cut = match entry {
            RecutEntry::Blank => "blank".to_string(),
            RecutEntry::Extract {
                source_path,
                extract_start,
                extract_duration,
            } => format!(
                "{} from {:.3}s for {:.3}s",
                source_path.display(),
                extract_start,
                extract_duration
            ),
        };
        println!("{:>4}  {:<24} {}", idx + 1, base_name, cut);
    }
}
