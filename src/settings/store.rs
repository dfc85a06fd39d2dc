//! Settings persistence, following the XDG Base Directory layout.
//!
//! The record lives in `$XDG_STATE_HOME/gaptime/settings.toml` unless the
//! configuration points elsewhere. It is read once at startup and written once
//! at shutdown, always as one complete record.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::{PersistedRecord, Settings};
use crate::common::constants::{CONFIG_DIR_NAME, SETTINGS_FILE_NAME};

/// Loads and saves the [`Settings`] record at one path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_STATE_HOME/gaptime/settings.toml`, with `~/.local/state` as the
    /// fallback state home.
    pub fn default_path() -> Result<PathBuf> {
        let state_home = match std::env::var_os("XDG_STATE_HOME") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .context("Could not determine home directory for settings")?
                .join(".local/state"),
        };
        Ok(state_home.join(CONFIG_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record, falling back to defaults for anything it lacks.
    ///
    /// A missing file is a first start and yields the defaults. A file that
    /// exists but cannot be read or parsed is an error.
    pub fn load(&self) -> Result<Settings> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Settings::default()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read settings from {}", self.path.display())
                });
            }
        };

        let record: PersistedRecord = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", self.path.display()))?;

        Ok(record.into_settings())
    }

    /// Write the complete record atomically.
    ///
    /// The record goes to a temporary file next to the target, which then
    /// replaces the target in one rename. A sibling lock file keeps two
    /// writers from interleaving.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create settings directory {}", dir.display()))?;

        let lock_path = self.path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file {}", lock_path.display()))?;
        lock_file
            .lock_exclusive()
            .with_context(|| format!("Failed to lock {}", lock_path.display()))?;

        let result = self.write_record(dir, settings);

        let _ = FileExt::unlock(&lock_file);
        result
    }

    fn write_record(&self, dir: &Path, settings: &Settings) -> Result<()> {
        let body = toml::to_string(&PersistedRecord::from(settings))
            .context("Failed to serialize settings")?;

        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        writeln!(temp, "# gaptime settings, rewritten on every shutdown")?;
        temp.write_all(body.as_bytes())?;
        temp.as_file().sync_all()?;

        temp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;
        Ok(())
    }
}
