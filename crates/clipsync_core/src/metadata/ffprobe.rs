//! Container durations via ffprobe.

use std::path::{Path, PathBuf};

use super::{run_tool, validate_duration, MetadataError, MetadataResult};

/// Reads `format=duration` with ffprobe.
pub struct FfprobeDurationProbe {
    program: PathBuf,
}

impl FfprobeDurationProbe {
    /// Create a probe using the given ffprobe binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Length of the file in seconds.
    pub fn duration_seconds(&self, path: &Path) -> MetadataResult<f64> {
        let args = vec![
            "-v".to_string(),
            "quiet".to_string(),
            "-i".to_string(),
            path.display().to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "csv=p=0".to_string(),
        ];
        let output = run_tool(&self.program, &args)?;
        parse_duration_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse ffprobe's `csv=p=0` duration line.
pub fn parse_duration_output(stdout: &str) -> MetadataResult<f64> {
    let line = stdout.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    let seconds: f64 = line
        .parse()
        .map_err(|_| MetadataError::parse("ffprobe duration", format!("'{}'", line)))?;
    validate_duration(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_seconds() {
        assert_eq!(parse_duration_output("62.560000\n").unwrap(), 62.56);
    }

    #[test]
    fn skips_blank_lines() {
        assert_eq!(parse_duration_output("\n  10.5  \n").unwrap(), 10.5);
    }

    #[test]
    fn rejects_not_available() {
        assert!(parse_duration_output("N/A\n").is_err());
        assert!(parse_duration_output("").is_err());
    }
}
