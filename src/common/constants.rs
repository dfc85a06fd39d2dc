//! Application constants and default values for gaptime.
//!
//! This module contains the fixed-point angle unit, the refresh throttling
//! policy, settings defaults, validation limits and the host's operational
//! timing constants.

// ═══ Angle Units ═══

/// One full revolution of a hand in fixed-point turn units.
pub const TRIG_MAX_ANGLE: u32 = 0x10000;

/// Hour-hand steps per revolution: 12 hours, each split into six 10-minute steps.
pub const HOUR_HAND_STEPS: u32 = 12 * 6;
pub const MINUTES_PER_HOUR: u32 = 60;
pub const SECONDS_PER_MINUTE: u32 = 60;

/// The hour hand creeps forward once per this many minutes.
pub const HOUR_HAND_CREEP_MINUTES: u32 = 10;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

// ═══ Sun Window Refresh Policy ═══
// Requests for fresh sunrise/sunset bounds are only issued on 20-minute
// boundaries, and only when the last refresh is at least an hour old.

pub const REFRESH_THROTTLE_MINUTES: u16 = 20; // minimum spacing between requests
pub const REFRESH_STALE_AFTER_MINUTES: i32 = 60; // age at which bounds are considered stale

// ═══ Settings Defaults ═══
// Used when no persisted record exists or a legacy record lacks the field

pub const DEFAULT_INVERTED: bool = false;
pub const DEFAULT_TEXT_CLOCK_VISIBLE: bool = false;
pub const DEFAULT_HAND_ORDER: &str = "SMH"; // Second outer, Minute middle, Hour inner

/// Legacy persisted records used 255 for "not configured".
pub const LEGACY_UNSET_BYTE: u8 = 255;

// ═══ Configuration Defaults and Limits ═══

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000; // at least one tick per second
pub const MINIMUM_TICK_INTERVAL_MS: u64 = 100;
pub const MAXIMUM_TICK_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_CLOCK_24H: bool = true;

pub const CONFIG_DIR_NAME: &str = "gaptime";
pub const CONFIG_FILE_NAME: &str = "gaptime.toml";
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

// ═══ Host Timing ═══

pub const DEFAULT_SIMULATION_MULTIPLIER: f64 = 60.0; // one simulated minute per real second

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1;
