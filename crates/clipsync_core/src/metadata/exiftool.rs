//! Capture timestamps via `exiftool -j`.
//!
//! exiftool is run with `-G` so keys come back group-qualified
//! (`H264:DateTimeOriginal`, `QuickTime:CreateDate`). A configured tag matches
//! a key when it equals the key or the key's name after the group prefix.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::datetime::parse_capture_datetime;
use super::{run_tool, validate_duration, MetadataError, MetadataProvider, MetadataResult};

type Record = Map<String, Value>;

/// Reads capture timestamps (and a fallback duration) with exiftool.
///
/// Records are cached per path, so a [`prefetch`](MetadataProvider::prefetch)
/// over a whole directory costs a single exiftool process.
pub struct ExifToolProvider {
    program: PathBuf,
    datetime_tags: Vec<String>,
    cache: Mutex<HashMap<PathBuf, Record>>,
}

impl ExifToolProvider {
    /// Create a provider with timestamp tags in priority order.
    pub fn new(program: impl Into<PathBuf>, datetime_tags: Vec<String>) -> Self {
        Self {
            program: program.into(),
            datetime_tags,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Timestamp tags in priority order.
    pub fn datetime_tags(&self) -> &[String] {
        &self.datetime_tags
    }

    fn build_args(&self, paths: &[PathBuf]) -> Vec<String> {
        let mut args = vec!["-j".to_string(), "-G".to_string(), "-n".to_string()];
        for tag in &self.datetime_tags {
            args.push(format!("-{}", tag));
        }
        args.push("-Duration".to_string());
        args.extend(paths.iter().map(|p| p.display().to_string()));
        args
    }

    fn run_batch(&self, paths: &[PathBuf]) -> MetadataResult<Vec<Record>> {
        let output = run_tool(&self.program, &self.build_args(paths))?;
        parse_records(&output.stdout)
    }

    fn record(&self, path: &Path) -> MetadataResult<Record> {
        if let Some(record) = self.cache.lock().get(path) {
            return Ok(record.clone());
        }

        let records = self.run_batch(&[path.to_path_buf()])?;
        let record = records.into_iter().next().ok_or(MetadataError::NotFound)?;
        self.cache.lock().insert(path.to_path_buf(), record.clone());
        Ok(record)
    }
}

impl MetadataProvider for ExifToolProvider {
    fn prefetch(&self, paths: &[PathBuf]) -> MetadataResult<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let records = self.run_batch(paths)?;
        let mut cache = self.cache.lock();
        for record in records {
            if let Some(source) = record.get("SourceFile").and_then(Value::as_str) {
                cache.insert(PathBuf::from(source), record);
            }
        }

        tracing::debug!("exiftool prefetched {} records", cache.len());
        Ok(())
    }

    fn capture_datetime(&self, path: &Path) -> MetadataResult<DateTime<FixedOffset>> {
        let record = self.record(path)?;
        let raw = first_present_tag(&record, &self.datetime_tags).ok_or_else(|| {
            MetadataError::TagMissing {
                tags: self.datetime_tags.clone(),
            }
        })?;
        parse_capture_datetime(&raw)
    }

    fn duration_seconds(&self, path: &Path) -> MetadataResult<f64> {
        let record = self.record(path)?;
        let value = find_tag(&record, "Duration").ok_or_else(|| MetadataError::TagMissing {
            tags: vec!["Duration".to_string()],
        })?;

        let seconds = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches(" s").parse().ok(),
            _ => None,
        }
        .ok_or_else(|| MetadataError::parse("Duration tag", value.to_string()))?;

        validate_duration(seconds)
    }
}

/// Parse the JSON array exiftool prints for `-j`.
fn parse_records(stdout: &[u8]) -> MetadataResult<Vec<Record>> {
    let value: Value = serde_json::from_slice(stdout)
        .map_err(|e| MetadataError::parse("exiftool output", e.to_string()))?;

    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect()),
        other => Err(MetadataError::parse(
            "exiftool output",
            format!("expected an array, got {}", other),
        )),
    }
}

/// Find a tag by bare name, ignoring the group prefix.
fn find_tag<'a>(record: &'a Record, tag: &str) -> Option<&'a Value> {
    record.iter().find_map(|(key, value)| {
        let name = key.rsplit(':').next().unwrap_or(key);
        (name == tag).then_some(value)
    })
}

/// First tag in priority order that carries a string value.
fn first_present_tag(record: &Record, tags: &[String]) -> Option<String> {
    tags.iter().find_map(|tag| {
        find_tag(record, tag).and_then(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "SourceFile": "/footage/wide/00001.MTS",
            "H264:DateTimeOriginal": "2013:03:16 13:46:09+01:00 DST",
            "Composite:Duration": 62.5
        },
        {
            "SourceFile": "/footage/wide/00002.MP4",
            "QuickTime:CreateDate": "2013:03:16 12:50:00",
            "QuickTime:Duration": "12.25 s"
        }
    ]"#;

    fn tags() -> Vec<String> {
        vec!["DateTimeOriginal".to_string(), "CreateDate".to_string()]
    }

    fn seeded_provider() -> ExifToolProvider {
        let provider = ExifToolProvider::new("/nonexistent/exiftool", tags());
        let records = parse_records(SAMPLE.as_bytes()).unwrap();
        let mut cache = provider.cache.lock();
        for record in records {
            let source = record["SourceFile"].as_str().unwrap().to_string();
            cache.insert(PathBuf::from(source), record);
        }
        drop(cache);
        provider
    }

    #[test]
    fn find_tag_ignores_group() {
        let records = parse_records(SAMPLE.as_bytes()).unwrap();
        assert!(find_tag(&records[0], "DateTimeOriginal").is_some());
        assert!(find_tag(&records[0], "CreateDate").is_none());
    }

    #[test]
    fn priority_falls_back_to_second_tag() {
        let records = parse_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            first_present_tag(&records[1], &tags()).as_deref(),
            Some("2013:03:16 12:50:00")
        );
    }

    #[test]
    fn reads_cached_records_without_running_exiftool() {
        let provider = seeded_provider();
        let dt = provider
            .capture_datetime(Path::new("/footage/wide/00001.MTS"))
            .unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 3600);

        let d = provider
            .duration_seconds(Path::new("/footage/wide/00002.MP4"))
            .unwrap();
        assert_eq!(d, 12.25);
    }

    #[test]
    fn missing_tags_are_reported() {
        let provider = ExifToolProvider::new("/nonexistent/exiftool", vec!["GPSDateTime".into()]);
        let records = parse_records(SAMPLE.as_bytes()).unwrap();
        provider
            .cache
            .lock()
            .insert(PathBuf::from("/a.MTS"), records[0].clone());

        let err = provider.capture_datetime(Path::new("/a.MTS")).unwrap_err();
        assert!(matches!(err, MetadataError::TagMissing { .. }));
    }

    #[test]
    fn args_request_tags_in_order() {
        let provider = ExifToolProvider::new("exiftool", tags());
        let args = provider.build_args(&[PathBuf::from("/a.MTS")]);
        assert_eq!(
            args,
            vec!["-j", "-G", "-n", "-DateTimeOriginal", "-CreateDate", "-Duration", "/a.MTS"]
        );
    }

    #[test]
    fn rejects_non_array_output() {
        assert!(parse_records(b"{}").is_err());
        assert!(parse_records(b"not json").is_err());
    }
}
