//! Core enums used throughout the library.

use serde::{Deserialize, Serialize};

/// How a merged timeline is written back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterializeMode {
    /// Rename clips in place and drop blanks next to them.
    ///
    /// Destructive: the original file names are gone afterwards.
    RenameAndPad,
    /// Copy clips and blanks into an output subdirectory.
    #[default]
    Copy,
}

impl MaterializeMode {
    /// Name used on the command line and in reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RenameAndPad => "rename",
            Self::Copy => "copy",
        }
    }

    /// Whether this mode writes into the output subdirectory.
    pub fn uses_output_dir(&self) -> bool {
        matches!(self, Self::Copy)
    }
}

impl std::fmt::Display for MaterializeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_copy_uses_output_dir() {
        assert!(MaterializeMode::Copy.uses_output_dir());
        assert!(!MaterializeMode::RenameAndPad.uses_output_dir());
    }

    #[test]
    fn display_uses_mode_name() {
        assert_eq!(MaterializeMode::RenameAndPad.to_string(), "rename");
        assert_eq!(MaterializeMode::Copy.to_string(), "copy");
    }

    #[test]
    fn mode_serializes_snake_case() {
        let json = serde_json::to_string(&MaterializeMode::RenameAndPad).unwrap();
        assert_eq!(json, "\"rename_and_pad\"");
    }
}
