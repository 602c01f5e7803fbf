//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::group::{MediaFilter, DEFAULT_EXTENSIONS};
use crate::logging::{LogConfig, LogLevel};
use crate::materialize::{SequenceNamer, DEFAULT_OUTPUT_SUBDIR};
use crate::metadata::ToolMetadataProvider;
use crate::models::RecutPadding;
use crate::recut::FfmpegTrimExecutor;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Directory scanning and metadata tools.
    #[serde(default)]
    pub scan: ScanSettings,

    /// Output file naming.
    #[serde(default)]
    pub naming: NamingSettings,

    /// Secondary recut padding and trim tool.
    #[serde(default)]
    pub recut: RecutSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Logs folder, output subdirectory, and remembered folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Subdirectory of each angle folder receiving copied/recut output.
    #[serde(default = "default_output_subdir")]
    pub output_subdir: String,

    /// Placeholder clip used to pad unmatched slots.
    #[serde(default = "default_blank_source")]
    pub blank_source: String,

    /// Last used base angle folder.
    #[serde(default)]
    pub last_base_path: String,

    /// Last used secondary angle folder.
    #[serde(default)]
    pub last_secondary_path: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_output_subdir() -> String {
    DEFAULT_OUTPUT_SUBDIR.to_string()
}

fn default_blank_source() -> String {
    "blank.mp4".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            logs_folder: default_logs_folder(),
            output_subdir: default_output_subdir(),
            blank_source: default_blank_source(),
            last_base_path: String::new(),
            last_secondary_path: String::new(),
        }
    }
}

impl PathSettings {
    /// Blank placeholder clip as a path.
    pub fn blank_source_path(&self) -> PathBuf {
        PathBuf::from(&self.blank_source)
    }
}

/// Which files make up a clip group and how their metadata is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Accepted file extensions (case-insensitive).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Capture timestamp tags, in priority order.
    #[serde(default = "default_datetime_tags")]
    pub datetime_tags: Vec<String>,

    /// exiftool binary.
    #[serde(default = "default_exiftool_path")]
    pub exiftool_path: String,

    /// ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_datetime_tags() -> Vec<String> {
    vec!["DateTimeOriginal".to_string(), "CreateDate".to_string()]
}

fn default_exiftool_path() -> String {
    "exiftool".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            datetime_tags: default_datetime_tags(),
            exiftool_path: default_exiftool_path(),
            ffprobe_path: default_ffprobe_path(),
        }
    }
}

impl ScanSettings {
    /// Extension filter for directory scans.
    pub fn media_filter(&self) -> MediaFilter {
        MediaFilter::new(self.extensions.iter())
    }

    /// Metadata provider backed by the configured exiftool and ffprobe.
    pub fn tool_provider(&self) -> ToolMetadataProvider {
        ToolMetadataProvider::new(
            &self.exiftool_path,
            &self.ffprobe_path,
            self.datetime_tags.clone(),
        )
    }
}

/// Sequential output names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingSettings {
    /// Text placed before the slot number.
    #[serde(default)]
    pub prefix: String,

    /// Zero-padded digits in the slot number.
    #[serde(default = "default_width")]
    pub width: usize,

    /// Extension given to blank placeholders.
    #[serde(default = "default_blank_extension")]
    pub blank_extension: String,
}

fn default_width() -> usize {
    4
}

fn default_blank_extension() -> String {
    "mp4".to_string()
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            width: default_width(),
            blank_extension: default_blank_extension(),
        }
    }
}

impl NamingSettings {
    pub fn namer(&self) -> SequenceNamer {
        SequenceNamer::new(&self.prefix, self.width, &self.blank_extension)
    }
}

/// Secondary recut settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecutSettings {
    /// Seconds kept past the base clip's end when cutting from a secondary start.
    #[serde(default = "default_trailing_pad")]
    pub trailing_pad: f64,

    /// Seconds kept before the base clip's start for window cuts.
    #[serde(default = "default_lead_pad")]
    pub lead_pad: f64,

    /// Seconds added to the base duration for window cuts.
    #[serde(default = "default_window_pad")]
    pub window_pad: f64,

    /// ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Re-encode instead of stream copy.
    #[serde(default)]
    pub reencode: bool,
}

fn default_trailing_pad() -> f64 {
    RecutPadding::default().trailing_pad
}

fn default_lead_pad() -> f64 {
    RecutPadding::default().lead_pad
}

fn default_window_pad() -> f64 {
    RecutPadding::default().window_pad
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

impl Default for RecutSettings {
    fn default() -> Self {
        Self {
            trailing_pad: default_trailing_pad(),
            lead_pad: default_lead_pad(),
            window_pad: default_window_pad(),
            ffmpeg_path: default_ffmpeg_path(),
            reencode: false,
        }
    }
}

impl RecutSettings {
    pub fn padding(&self) -> RecutPadding {
        RecutPadding {
            trailing_pad: self.trailing_pad,
            lead_pad: self.lead_pad,
            window_pad: self.window_pad,
        }
    }

    /// ffmpeg trim executor with the configured binary and encode mode.
    pub fn ffmpeg_executor(&self) -> FfmpegTrimExecutor {
        FfmpegTrimExecutor::new(&self.ffmpeg_path).reencode(self.reencode)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for console and run logs.
    #[serde(default)]
    pub level: LogLevel,

    /// Keep external tool output out of the run log unless a tool fails.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines shown when a tool fails.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            error_tail: default_error_tail(),
        }
    }
}

impl LoggingSettings {
    /// Run logger configuration from these settings.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            compact: self.compact,
            error_tail: self.error_tail as usize,
            ..LogConfig::default()
        }
    }
}

/// Config sections that can be updated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Scan,
    Naming,
    Recut,
    Logging,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Scan,
        ConfigSection::Naming,
        ConfigSection::Recut,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Scan => "scan",
            ConfigSection::Naming => "naming",
            ConfigSection::Recut => "recut",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the table.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Logs, output subdirectory, and blank placeholder",
            ConfigSection::Scan => "Clip discovery and metadata tools",
            ConfigSection::Naming => "Sequential output names",
            ConfigSection::Recut => "Secondary recut padding (seconds) and trim tool",
            ConfigSection::Logging => "Logging configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn default_settings_serialize() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        assert!(toml_str.contains("[paths]"));
        assert!(toml_str.contains("[scan]"));
        assert!(toml_str.contains("[recut]"));
    }

    #[test]
    fn settings_roundtrip() {
        let mut original = Settings::default();
        original.naming.prefix = "CAM_".to_string();
        original.recut.window_pad = 3.0;
        let toml_str = toml::to_string_pretty(&original).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.naming.prefix, "CAM_");
        assert_eq!(parsed.recut.window_pad, 3.0);
        assert_eq!(parsed.scan.extensions, vec!["MTS", "MP4"]);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let partial = r#"
[recut]
lead_pad = 0.5
"#;
        let settings: Settings = toml::from_str(partial).unwrap();
        let padding = settings.recut.padding();
        assert_eq!(padding.lead_pad, 0.5);
        assert_eq!(padding.trailing_pad, 1.0);
        assert_eq!(padding.window_pad, 2.0);
        assert_eq!(settings.naming.width, 4);
        assert_eq!(settings.logging.level, LogLevel::Info);
    }

    #[test]
    fn scan_settings_build_filter() {
        let scan = ScanSettings {
            extensions: vec![".mov".to_string()],
            ..ScanSettings::default()
        };
        let filter = scan.media_filter();
        assert!(filter.matches(Path::new("/a/CLIP.MOV")));
        assert!(!filter.matches(Path::new("/a/00001.MTS")));
    }

    #[test]
    fn naming_settings_build_namer() {
        let naming = NamingSettings {
            prefix: "A".to_string(),
            width: 3,
            ..NamingSettings::default()
        };
        assert_eq!(naming.namer().blank_name(7), "A007.mp4");
    }
}
