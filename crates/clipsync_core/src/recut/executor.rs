//! Carrying out a recut plan with an external trim tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{SyncError, SyncResult};
use crate::logging::RunLogger;
use crate::materialize::{clear_stale_slots, SequenceNamer};
use crate::models::{RecutEntry, RecutPlan};

/// Cuts a segment out of a media file.
pub trait TrimExecutor {
    /// Write `duration` seconds of `source`, starting at `start`, to
    /// `destination`.
    fn extract(
        &self,
        source: &Path,
        start: f64,
        duration: f64,
        destination: &Path,
    ) -> SyncResult<()>;
}

/// Format seconds as an ffmpeg `-ss` timestamp (`H:MM:SS.mmm`).
pub fn format_ffmpeg_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

/// Trims with ffmpeg, stream-copying by default.
pub struct FfmpegTrimExecutor {
    program: PathBuf,
    stream_copy: bool,
    logger: Option<Arc<RunLogger>>,
}

impl FfmpegTrimExecutor {
    /// Create an executor using the given ffmpeg binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            stream_copy: true,
            logger: None,
        }
    }

    /// Re-encode instead of stream-copying (frame-accurate, slower).
    pub fn reencode(mut self, reencode: bool) -> Self {
        self.stream_copy = !reencode;
        self
    }

    /// Record commands and tool output in a run log.
    pub fn with_logger(mut self, logger: Arc<RunLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Arguments for one trim.
    pub fn build_args(&self, source: &Path, start: f64, duration: f64, destination: &Path) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-ss".to_string(),
            format_ffmpeg_timestamp(start),
            "-i".to_string(),
            source.display().to_string(),
            "-t".to_string(),
            format!("{:.3}", duration.max(0.0)),
        ];
        if self.stream_copy {
            args.push("-c".to_string());
            args.push("copy".to_string());
        }
        args.push(destination.display().to_string());
        args
    }
}

impl TrimExecutor for FfmpegTrimExecutor {
    fn extract(
        &self,
        source: &Path,
        start: f64,
        duration: f64,
        destination: &Path,
    ) -> SyncResult<()> {
        let args = self.build_args(source, start, duration, destination);
        let command_line = format!("{} {}", self.program.display(), args.join(" "));
        tracing::debug!("Running: {}", command_line);
        if let Some(logger) = &self.logger {
            logger.command(&command_line);
        }

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| SyncError::trim_failed(source, destination, e.to_string()))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if let Some(logger) = &self.logger {
            for line in stderr.lines() {
                logger.output_line(line, true);
            }
        }

        if !output.status.success() {
            if let Some(logger) = &self.logger {
                logger.show_tail("ffmpeg");
            }
            let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            let message = format!(
                "ffmpeg exited with code {}: {}",
                output.status.code().unwrap_or(-1),
                tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
            );
            return Err(SyncError::trim_failed(source, destination, message));
        }

        Ok(())
    }
}

/// Where and how recut segments are written.
#[derive(Debug, Clone, Copy)]
pub struct RecutOutput<'a> {
    /// Slot naming scheme.
    pub namer: &'a SequenceNamer,
    /// Placeholder clip for base clips with no secondary coverage.
    pub blank_source: &'a Path,
    /// Subdirectory of the secondary directory receiving the segments.
    pub output_subdir: &'a str,
}

/// Summary of an executed recut.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecutReport {
    /// Segments cut out of secondary clips.
    pub extracted: usize,
    /// Blank fillers placed.
    pub blanks: usize,
    /// Directory holding the recut secondary set.
    pub target: PathBuf,
}

/// Write one secondary segment per plan entry into the output subdirectory.
///
/// Segment `n` is named with the token of base slot `n`. Slot files from an
/// earlier pass are removed first. The first failure aborts the pass.
pub fn execute_recut(
    plan: &RecutPlan,
    secondary_directory: &Path,
    output: &RecutOutput<'_>,
    executor: &dyn TrimExecutor,
) -> SyncResult<RecutReport> {
    if plan.blank_count() > 0 && !output.blank_source.is_file() {
        return Err(SyncError::BlankSourceMissing {
            path: output.blank_source.to_path_buf(),
        });
    }

    let target = secondary_directory.join(output.output_subdir);
    fs::create_dir_all(&target).map_err(|e| SyncError::unwritable(&target, e))?;
    clear_stale_slots(&target, output.namer)?;

    let mut report = RecutReport {
        target: target.clone(),
        ..Default::default()
    };

    for (idx, entry) in plan.entries.iter().enumerate() {
        let slot = idx + 1;
        match entry {
            RecutEntry::Blank => {
                let destination = target.join(output.namer.blank_name(slot));
                fs::copy(output.blank_source, &destination)
                    .map_err(|e| SyncError::unwritable(&destination, e))?;
                report.blanks += 1;
            }
            RecutEntry::Extract {
                source_path,
                extract_start,
                extract_duration,
            } => {
                if !source_path.is_file() {
                    return Err(SyncError::ClipMissing {
                        path: source_path.clone(),
                    });
                }
                let destination = target.join(output.namer.clip_name(slot, source_path));
                executor.extract(source_path, *extract_start, *extract_duration, &destination)?;
                report.extracted += 1;
            }
        }
    }

    tracing::info!(
        "Recut {} segments and {} blanks into {}",
        report.extracted,
        report.blanks,
        target.display()
    );

    Ok(report)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Records trims and writes a marker file instead of cutting media.
    #[derive(Default)]
    pub struct RecordingExecutor {
        pub calls: Mutex<Vec<(PathBuf, f64, f64, PathBuf)>>,
        pub fail_on: Option<usize>,
    }

    impl TrimExecutor for RecordingExecutor {
        fn extract(
            &self,
            source: &Path,
            start: f64,
            duration: f64,
            destination: &Path,
        ) -> SyncResult<()> {
            let mut calls = self.calls.lock();
            if self.fail_on == Some(calls.len()) {
                return Err(SyncError::trim_failed(source, destination, "exit code 1"));
            }
            calls.push((source.to_path_buf(), start, duration, destination.to_path_buf()));
            fs::write(destination, format!("{}@{}+{}", source.display(), start, duration))
                .map_err(|e| SyncError::unwritable(destination, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingExecutor;
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn timestamps_format_like_ffmpeg() {
        assert_eq!(format_ffmpeg_timestamp(0.0), "0:00:00.000");
        assert_eq!(format_ffmpeg_timestamp(61.5), "0:01:01.500");
        assert_eq!(format_ffmpeg_timestamp(3725.25), "1:02:05.250");
        assert_eq!(format_ffmpeg_timestamp(-3.0), "0:00:00.000");
    }

    #[test]
    fn ffmpeg_args_stream_copy_by_default() {
        let exec = FfmpegTrimExecutor::new("ffmpeg");
        let args = exec.build_args(Path::new("/s/a.MTS"), 12.0, 8.0, Path::new("/s/output/0001.MTS"));
        assert_eq!(
            args,
            vec!["-y", "-ss", "0:00:12.000", "-i", "/s/a.MTS", "-t", "8.000", "-c", "copy", "/s/output/0001.MTS"]
        );

        let args = FfmpegTrimExecutor::new("ffmpeg")
            .reencode(true)
            .build_args(Path::new("a"), 0.0, 1.0, Path::new("b"));
        assert!(!args.contains(&"copy".to_string()));
    }

    #[test]
    fn missing_ffmpeg_is_trim_failure() {
        let exec = FfmpegTrimExecutor::new("/nonexistent/ffmpeg");
        let err = exec
            .extract(Path::new("a"), 0.0, 1.0, Path::new("b"))
            .unwrap_err();
        assert!(matches!(err, SyncError::TrimExecutionFailed { .. }));
    }

    #[test]
    fn executes_entries_in_slot_order() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("S1.MTS");
        fs::write(&source, b"s").unwrap();
        let blank = dir.path().join("blank.mp4");
        fs::write(&blank, b"BLANK").unwrap();

        let plan = RecutPlan {
            base_paths: vec![PathBuf::from("b1"), PathBuf::from("b2"), PathBuf::from("b3")],
            entries: vec![
                RecutEntry::Extract {
                    source_path: source.clone(),
                    extract_start: 0.0,
                    extract_duration: 8.0,
                },
                RecutEntry::Blank,
                RecutEntry::Extract {
                    source_path: source.clone(),
                    extract_start: 20.0,
                    extract_duration: 7.0,
                },
            ],
        };
        let namer = SequenceNamer::default();
        let output = RecutOutput {
            namer: &namer,
            blank_source: &blank,
            output_subdir: "output",
        };
        let exec = RecordingExecutor::default();

        let report = execute_recut(&plan, dir.path(), &output, &exec).unwrap();
        assert_eq!(report.extracted, 2);
        assert_eq!(report.blanks, 1);

        let calls = exec.calls.lock();
        assert_eq!(calls[1].1, 20.0);
        assert_eq!(calls[1].3, dir.path().join("output").join("0003.MTS"));
        assert_eq!(
            fs::read(dir.path().join("output").join("0002.mp4")).unwrap(),
            b"BLANK"
        );
    }

    #[test]
    fn rerun_replaces_earlier_segments() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("S1.MTS");
        fs::write(&source, b"s").unwrap();
        let blank = dir.path().join("blank.mp4");
        fs::write(&blank, b"BLANK").unwrap();
        let namer = SequenceNamer::default();
        let output = RecutOutput {
            namer: &namer,
            blank_source: &blank,
            output_subdir: "output",
        };

        let first = RecutPlan {
            base_paths: vec![PathBuf::from("b1"), PathBuf::from("b2")],
            entries: vec![RecutEntry::Blank, RecutEntry::Blank],
        };
        execute_recut(&first, dir.path(), &output, &RecordingExecutor::default()).unwrap();

        let second = RecutPlan {
            base_paths: vec![PathBuf::from("b1")],
            entries: vec![RecutEntry::Extract {
                source_path: source,
                extract_start: 0.0,
                extract_duration: 4.0,
            }],
        };
        execute_recut(&second, dir.path(), &output, &RecordingExecutor::default()).unwrap();

        let mut names: Vec<String> = fs::read_dir(dir.path().join("output"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["0001.MTS"]);
    }

    #[test]
    fn executor_failure_aborts() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("S1.MTS");
        fs::write(&source, b"s").unwrap();
        let entry = RecutEntry::Extract {
            source_path: source,
            extract_start: 0.0,
            extract_duration: 1.0,
        };
        let plan = RecutPlan {
            base_paths: vec![PathBuf::from("b1"), PathBuf::from("b2")],
            entries: vec![entry.clone(), entry],
        };
        let namer = SequenceNamer::default();
        let blank = dir.path().join("unused.mp4");
        let output = RecutOutput {
            namer: &namer,
            blank_source: &blank,
            output_subdir: "output",
        };
        let exec = RecordingExecutor {
            fail_on: Some(1),
            ..Default::default()
        };

        let err = execute_recut(&plan, dir.path(), &output, &exec).unwrap_err();
        assert!(matches!(err, SyncError::TrimExecutionFailed { .. }));
        assert_eq!(exec.calls.lock().len(), 1);
    }

    #[test]
    fn blank_entries_need_blank_source() {
        let dir = tempdir().unwrap();
        let plan = RecutPlan {
            base_paths: vec![PathBuf::from("b1")],
            entries: vec![RecutEntry::Blank],
        };
        let namer = SequenceNamer::default();
        let blank = dir.path().join("missing.mp4");
        let output = RecutOutput {
            namer: &namer,
            blank_source: &blank,
            output_subdir: "output",
        };
        let err = execute_recut(&plan, dir.path(), &output, &RecordingExecutor::default())
            .unwrap_err();
        assert!(matches!(err, SyncError::BlankSourceMissing { .. }));
    }
}
