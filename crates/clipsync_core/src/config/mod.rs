//! Configuration management for clipsync.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use clipsync_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/clipsync.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Blank clip: {}", config.settings().paths.blank_source);
//!
//! config.settings_mut().recut.reencode = true;
//! config.update_section(ConfigSection::Recut).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult, DEFAULT_CONFIG_PATH};
pub use settings::{
    ConfigSection, LoggingSettings, NamingSettings, PathSettings, RecutSettings, ScanSettings,
    Settings,
};
