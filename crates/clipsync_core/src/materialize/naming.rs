//! Sequence tokens for materialized timelines.

use std::path::Path;

/// Names timeline slots with 1-based, zero-padded tokens.
///
/// With the default width of 4 and no prefix, slot 1 becomes `0001`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceNamer {
    prefix: String,
    width: usize,
    blank_extension: String,
}

impl SequenceNamer {
    /// Create a namer.
    pub fn new(prefix: impl Into<String>, width: usize, blank_extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            width,
            blank_extension: blank_extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// Token for a 1-based slot number.
    pub fn token(&self, slot: usize) -> String {
        format!("{}{:0width$}", self.prefix, slot, width = self.width)
    }

    /// File name for a slot, keeping the extension of `source`.
    ///
    /// Sources without an extension get a bare token.
    pub fn clip_name(&self, slot: usize, source: &Path) -> String {
        match source.extension() {
            Some(ext) => format!("{}.{}", self.token(slot), ext.to_string_lossy()),
            None => self.token(slot),
        }
    }

    /// File name for a blank filler in a slot.
    pub fn blank_name(&self, slot: usize) -> String {
        format!("{}.{}", self.token(slot), self.blank_extension)
    }

    /// Whether `file_name` is a slot file this namer could have written:
    /// the prefix, at least `width` digits, then an optional extension.
    pub fn is_slot_name(&self, file_name: &str) -> bool {
        let stem = file_name.split_once('.').map_or(file_name, |(stem, _)| stem);
        match stem.strip_prefix(self.prefix.as_str()) {
            Some(digits) => {
                digits.len() >= self.width.max(1) && digits.bytes().all(|b| b.is_ascii_digit())
            }
            None => false,
        }
    }

    /// Extension given to blank fillers.
    pub fn blank_extension(&self) -> &str {
        &self.blank_extension
    }
}

impl Default for SequenceNamer {
    fn default() -> Self {
        Self::new("", 4, "mp4")
    }
}
