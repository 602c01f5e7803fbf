//! Capture timestamp parsing.
//!
//! Cameras write EXIF-style dates (`2024:05:01 10:00:00`), sometimes with a
//! fractional second, a UTC offset, or the AVCHD ` DST` marker. Timestamps
//! without an offset are taken as UTC; only differences within one angle
//! matter, so a consistent choice is enough.

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use super::{MetadataError, MetadataResult};

/// Parse a capture timestamp as written by exiftool.
pub fn parse_capture_datetime(raw: &str) -> MetadataResult<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_suffix("DST")
        .map(str::trim_end)
        .unwrap_or(trimmed);

    let (date, rest) = match (trimmed.get(..10), trimmed.get(10..)) {
        (Some(date), Some(rest)) => (date, rest),
        _ => return Err(invalid(raw)),
    };

    let date = date.replace(':', "-");
    let time = rest.trim_start_matches([' ', 'T']);
    let time = match time.strip_suffix('Z') {
        Some(utc) => format!("{}+00:00", utc),
        None => time.to_string(),
    };
    let normalized = format!("{}T{}", date, time);

    for format in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Ok(dt);
        }
    }

    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|_| invalid(raw))
}

fn invalid(raw: &str) -> MetadataError {
    MetadataError::parse("capture timestamp", format!("'{}'", raw))
}
