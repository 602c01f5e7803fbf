//! Loading and persisting `clipsync.toml`.
//!
//! Whole-file saves are rendered from the settings; single-section updates go
//! through `toml_edit` so hand edits elsewhere in the file survive. Every
//! write lands in a temp file first and is renamed into place.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Config file used when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = ".config/clipsync.toml";

/// Manages application configuration.
///
/// Handles loading, saving, and atomic section-level updates.
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Current settings loaded in memory.
    settings: Settings,
}

impl ConfigManager {
    /// Manager for the config file at `config_path`. Nothing is read until
    /// [`load`](Self::load) or [`load_or_create`](Self::load_or_create).
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// In-memory settings; persisted only by `save()` or `update_section()`.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Read an existing config file.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.is_file() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }
        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Read the config file, writing defaults first if it is missing.
    ///
    /// Missing keys are filled with defaults and unknown sections dropped;
    /// the file is rewritten when either happened.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            tracing::info!("Creating default config {}", self.config_path.display());
            self.settings = Settings::default();
            return self.save();
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;

        let stale = self.has_unknown_sections(&content)? || content != self.render()?;
        if stale {
            tracing::debug!("Rewriting {} with defaults filled in", self.config_path.display());
            self.save()?;
        }
        Ok(())
    }

    /// Create the logs folder if needed. Output folders are created per run
    /// inside the angle folders.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        fs::create_dir_all(self.logs_folder())?;
        Ok(())
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.logs_folder)
    }

    /// Record the angle folders of the latest run and persist the paths section.
    pub fn remember_angles(&mut self, base: &Path, secondary: &Path) -> ConfigResult<()> {
        let paths = &mut self.settings.paths;
        paths.last_base_path = base.display().to_string();
        paths.last_secondary_path = secondary.display().to_string();
        self.update_section(ConfigSection::Paths)
    }

    /// Write every section, replacing the file atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.render()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Replace one table in the file on disk, leaving the others (and their
    /// comments) as they are there rather than as they are in memory.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let mut doc = match fs::read_to_string(&self.config_path) {
            Ok(content) => content.parse::<DocumentMut>()?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => DocumentMut::new(),
            Err(e) => return Err(e.into()),
        };

        let fresh: DocumentMut = self.section_body(section)?.parse()?;
        doc[section.table_name()] = Item::Table(fresh.as_table().clone());

        self.atomic_write(&doc.to_string())?;
        Ok(())
    }

    fn has_unknown_sections(&self, content: &str) -> ConfigResult<bool> {
        let doc: DocumentMut = content.parse()?;
        let unknown: Vec<&str> = doc
            .iter()
            .map(|(key, _)| key)
            .filter(|key| !ConfigSection::ALL.iter().any(|s| s.table_name() == *key))
            .collect();
        if !unknown.is_empty() {
            tracing::warn!(
                "Dropping unknown config sections from {}: {}",
                self.config_path.display(),
                unknown.join(", ")
            );
        }
        Ok(!unknown.is_empty())
    }

    fn section_body(&self, section: ConfigSection) -> ConfigResult<String> {
        let body = match section {
            ConfigSection::Paths => toml::to_string_pretty(&self.settings.paths)?,
            ConfigSection::Scan => toml::to_string_pretty(&self.settings.scan)?,
            ConfigSection::Naming => toml::to_string_pretty(&self.settings.naming)?,
            ConfigSection::Recut => toml::to_string_pretty(&self.settings.recut)?,
            ConfigSection::Logging => toml::to_string_pretty(&self.settings.logging)?,
        };
        Ok(body)
    }

    /// Full file content, one commented table per section.
    fn render(&self) -> ConfigResult<String> {
        let mut output = String::from("# clipsync configuration\n");
        output.push_str("# Regenerated when keys are missing; section updates keep comments.\n");

        for section in ConfigSection::ALL {
            output.push_str(&format!(
                "\n# {}\n[{}]\n",
                section.description(),
                section.table_name()
            ));
            output.push_str(&self.section_body(section)?);
            if !output.ends_with('\n') {
                output.push('\n');
            }
        }

        Ok(output)
    }

    /// Write to `<name>.toml.tmp` next to the config, then rename over it.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.config_path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.config_path)
    }
}
