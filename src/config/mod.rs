//! Host configuration for gaptime.
//!
//! The configuration covers only the host shell: where settings are stored,
//! how often the engine ticks, and an optional location for the built-in sun
//! companion. Watchface settings themselves (hand order, invert policy, window
//! bounds) live in the settings record and change through companion updates.
//!
//! ## Configuration Sources
//!
//! 1. `--config DIR` on the command line: `DIR/gaptime.toml`
//! 2. **XDG_CONFIG_HOME**/gaptime/gaptime.toml
//!
//! A missing file means defaults throughout.
//!
//! ## Configuration Structure
//!
//! ```toml
//! settings_file = "~/.local/state/gaptime/settings.toml" # Settings record location
//! tick_interval_ms = 1000                               # Engine tick period (100-1000)ms
//! clock_24h = true                                      # 24-hour times in log output
//!
//! #[Sun companion]
//! latitude = 52.5200     # Geographic latitude
//! longitude = 13.4050    # Geographic longitude
//! ```
//!
//! Without coordinates, refresh requests are written to standard output for an
//! external companion to answer.

pub mod loading;
pub mod validation;

use anyhow::Result;
use chrono::NaiveTime;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::constants::*;
use crate::common::paths::{expand_tilde, private_path};
use crate::settings::SettingsStore;

pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

/// Parsed `gaptime.toml`. Every field is optional.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Settings record path override. `~/` is expanded.
    pub settings_file: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub tick_interval_ms: Option<u64>,
    pub clock_24h: Option<bool>,
}

impl Config {
    /// Load from the configured directory, see [`loading::load`].
    pub fn load() -> Result<Self> {
        load()
    }

    pub fn get_config_path() -> Result<PathBuf> {
        get_config_path()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.unwrap_or(DEFAULT_TICK_INTERVAL_MS))
    }

    /// Location for the built-in sun companion, when both halves are set.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    pub fn clock_24h(&self) -> bool {
        self.clock_24h.unwrap_or(DEFAULT_CLOCK_24H)
    }

    /// Format a wall-clock time the way the user asked for.
    pub fn format_time(&self, time: NaiveTime) -> String {
        if self.clock_24h() {
            time.format("%H:%M").to_string()
        } else {
            time.format("%-I:%M %p").to_string()
        }
    }

    /// Where the settings record lives.
    pub fn settings_path(&self) -> Result<PathBuf> {
        match self.settings_file.as_deref() {
            Some(path) => expand_tilde(path),
            None => SettingsStore::default_path(),
        }
    }

    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");

        match Self::get_config_path() {
            Ok(path) if path.exists() => log_indented!("Source: {}", private_path(&path)),
            Ok(path) => log_indented!("Source: defaults ({} not found)", private_path(&path)),
            Err(_) => log_indented!("Source: defaults"),
        }

        match self.settings_path() {
            Ok(path) => log_indented!("Settings: {}", private_path(&path)),
            Err(e) => log_indented!("Settings: unresolved ({e})"),
        }

        log_indented!("Tick interval: {}ms", self.tick_interval().as_millis());
        log_indented!("Clock: {}", if self.clock_24h() { "24-hour" } else { "12-hour" });

        if let Some((lat, lon)) = self.coordinates() {
            let lat_dir = if lat >= 0.0 { "N" } else { "S" };
            let lon_dir = if lon >= 0.0 { "E" } else { "W" };
            log_indented!(
                "Sun companion: {:.3}°{}, {:.3}°{}",
                lat.abs(),
                lat_dir,
                lon.abs(),
                lon_dir
            );
        } else {
            log_indented!("Sun companion: external (requests on stdout)");
        }
    }
}
