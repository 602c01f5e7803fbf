//! Per-run log file.
//!
//! Each `match` or `recut` run writes `<logs>/<run name>.log` with its
//! phases, the external commands it issued and, when a tool fails, the last
//! lines that tool printed.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

/// Log of one synchronization run.
///
/// Shared between the session and the trim executor through an `Arc`.
pub struct RunLogger {
    run_name: String,
    log_path: PathBuf,
    config: LogConfig,
    sink: Option<LogCallback>,
    state: Mutex<State>,
}

struct State {
    file: Option<BufWriter<File>>,
    /// Most recent tool output, oldest first.
    tail: VecDeque<String>,
}

impl RunLogger {
    /// Create `<logs_dir>/<run_name>.log`, truncating an earlier log of the
    /// same name. `sink` receives every line that reaches the file.
    pub fn new(
        run_name: impl Into<String>,
        logs_dir: impl AsRef<Path>,
        config: LogConfig,
        sink: Option<LogCallback>,
    ) -> io::Result<Self> {
        let run_name = run_name.into();
        fs::create_dir_all(logs_dir.as_ref())?;
        let log_path = logs_dir
            .as_ref()
            .join(format!("{}.log", file_safe(&run_name)));
        let file = File::create(&log_path)?;

        Ok(Self {
            state: Mutex::new(State {
                file: Some(BufWriter::new(file)),
                tail: VecDeque::with_capacity(config.error_tail),
            }),
            run_name,
            log_path,
            config,
            sink,
        })
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Write `message` if `level` passes the configured minimum.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level >= self.config.level {
            self.write_line(message);
        }
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    /// `$ <command line>`
    pub fn command(&self, command_line: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Command.format(command_line));
    }

    /// `=== <name> ===`
    pub fn phase(&self, name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Phase.format(name));
    }

    pub fn success(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Success.format(message));
    }

    /// One line printed by an external tool.
    ///
    /// Goes to the tail buffer; also to the log unless `compact` is set.
    pub fn output_line(&self, line: &str, is_stderr: bool) {
        {
            let mut state = self.state.lock();
            while state.tail.len() >= self.config.error_tail.max(1) {
                state.tail.pop_front();
            }
            state.tail.push_back(line.to_string());
        }

        if !self.config.compact {
            let stream = if is_stderr { "[stderr] " } else { "" };
            self.write_line(&format!("{stream}{line}"));
        }
    }

    /// Write the tail buffer under a `[<tool>/tail]` header.
    pub fn show_tail(&self, tool: &str) {
        let tail = self.get_tail();
        if tail.is_empty() {
            return;
        }
        self.write_line(&format!("[{tool}/tail]"));
        for line in &tail {
            self.write_line(line);
        }
    }

    /// Copy of the tail buffer.
    pub fn get_tail(&self) -> Vec<String> {
        self.state.lock().tail.iter().cloned().collect()
    }

    pub fn flush(&self) {
        if let Some(file) = self.state.lock().file.as_mut() {
            let _ = file.flush();
        }
    }

    /// Flush and release the file; later lines only reach the sink.
    pub fn close(&self) {
        if let Some(mut file) = self.state.lock().file.take() {
            let _ = file.flush();
        }
    }

    fn write_line(&self, message: &str) {
        let line = if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
        } else {
            message.to_string()
        };

        if let Some(file) = self.state.lock().file.as_mut() {
            let _ = writeln!(file, "{line}");
        }
        if let Some(sink) = &self.sink {
            sink(&line);
        }
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// `<base folder>_<secondary folder>_<YYYYmmdd-HHMMSS>`
pub fn default_run_name(base: &Path, secondary: &Path) -> String {
    let folder = |p: &Path| {
        p.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "angle".to_string())
    };
    format!(
        "{}_{}_{}",
        folder(base),
        folder(secondary),
        Local::now().format("%Y%m%d-%H%M%S")
    )
}

/// Replace characters that are not allowed in file names on common platforms.
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect()
}
