use serde::{Deserialize, Serialize};

/// Minimum severity, as written in `[logging] level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// How a [`RunLogger`](super::RunLogger) writes.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Keep external tool output out of the log unless the tool fails.
    pub compact: bool,
    /// Tool output lines remembered for failure reports.
    pub error_tail: usize,
    /// Prefix lines with `[HH:MM:SS]`.
    pub show_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            error_tail: 20,
            show_timestamps: true,
        }
    }
}

/// Receives every line written to a run log.
pub type LogCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Line markers used in run logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePrefix {
    /// `$ ffmpeg ...`
    Command,
    /// `=== Merge timelines ===`
    Phase,
    Success,
    Warning,
    Error,
}

impl MessagePrefix {
    pub fn format(&self, message: &str) -> String {
        match self {
            MessagePrefix::Command => format!("$ {message}"),
            MessagePrefix::Phase => format!("=== {message} ==="),
            MessagePrefix::Success => format!("[SUCCESS] {message}"),
            MessagePrefix::Warning => format!("[WARNING] {message}"),
            MessagePrefix::Error => format!("[ERROR] {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_format() {
        assert_eq!(MessagePrefix::Phase.format("Merge"), "=== Merge ===");
        assert_eq!(MessagePrefix::Command.format("ffmpeg -y"), "$ ffmpeg -y");
        assert_eq!(MessagePrefix::Error.format("boom"), "[ERROR] boom");
    }

    #[test]
    fn level_parses_lowercase() {
        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert!(LogLevel::Warn > LogLevel::Info);
    }
}
