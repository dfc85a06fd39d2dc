//! Configuration validation.

use anyhow::Result;

use super::Config;
use crate::common::constants::{MAXIMUM_TICK_INTERVAL_MS, MINIMUM_TICK_INTERVAL_MS};

/// Reject values the host cannot run with.
pub fn validate_config(config: &Config) -> Result<()> {
    // The engine has to tick at least once per second
    if let Some(interval_ms) = config.tick_interval_ms
        && !(MINIMUM_TICK_INTERVAL_MS..=MAXIMUM_TICK_INTERVAL_MS).contains(&interval_ms)
    {
        anyhow::bail!(
            "tick_interval_ms ({} ms) must be between {} and {} milliseconds",
            interval_ms,
            MINIMUM_TICK_INTERVAL_MS,
            MAXIMUM_TICK_INTERVAL_MS
        );
    }

    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    match (config.latitude, config.longitude) {
        (Some(_), None) => anyhow::bail!("latitude is set but longitude is missing"),
        (None, Some(_)) => anyhow::bail!("longitude is set but latitude is missing"),
        _ => {}
    }

    if let Some(path) = &config.settings_file
        && path.trim().is_empty()
    {
        anyhow::bail!("settings_file must not be empty");
    }

    Ok(())
}
