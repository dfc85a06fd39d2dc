//! The persisted settings record.
//!
//! [`Settings`] is the in-memory aggregate; [`PersistedRecord`] is its flat
//! on-disk layout. Every field of the record is optional so records written by
//! older revisions (which only knew the invert switch and the text clock)
//! still load: whatever is missing keeps its default.

pub mod store;

pub use store::SettingsStore;

use serde::{Deserialize, Serialize};

use crate::common::constants::{
    DEFAULT_INVERTED, DEFAULT_TEXT_CLOCK_VISIBLE, LEGACY_UNSET_BYTE, MINUTES_PER_DAY,
};
use crate::face::HandOrder;
use crate::schedule::{InvertPolicy, InvertWindow, RefreshState};

/// Everything that survives a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Last known invert flag. Derived from the policy; stored so windowed
    /// policies resume with the previous state until their next minute tick.
    pub inverted: bool,
    pub text_clock_visible: bool,
    pub hand_order: HandOrder,
    pub invert_policy: InvertPolicy,
    pub invert_window: InvertWindow,
    pub refresh: RefreshState,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inverted: DEFAULT_INVERTED,
            text_clock_visible: DEFAULT_TEXT_CLOCK_VISIBLE,
            hand_order: HandOrder::default(),
            invert_policy: InvertPolicy::default(),
            invert_window: InvertWindow::default(),
            refresh: RefreshState::default(),
        }
    }
}

/// Flat on-disk layout of [`Settings`].
///
/// `invert` and `text_time` are the field names of the first revision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    #[serde(alias = "invert", skip_serializing_if = "Option::is_none")]
    pub inverted: Option<bool>,
    #[serde(alias = "text_time", skip_serializing_if = "Option::is_none")]
    pub text_clock_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand_order: Option<HandOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invert_policy: Option<InvertPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_start_hour: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_start_minute: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_end_hour: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_end_minute: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh_minute: Option<u16>,
}

/// Drop the legacy 255 sentinel and anything else out of range.
fn in_range(value: Option<u8>, limit: u8) -> Option<u8> {
    value.filter(|v| *v != LEGACY_UNSET_BYTE && *v < limit)
}

impl From<&Settings> for PersistedRecord {
    fn from(settings: &Settings) -> Self {
        let window = &settings.invert_window;
        Self {
            inverted: Some(settings.inverted),
            text_clock_visible: Some(settings.text_clock_visible),
            hand_order: Some(settings.hand_order),
            invert_policy: Some(settings.invert_policy),
            window_start_hour: window.start_hour,
            window_start_minute: window.start_minute,
            window_end_hour: window.end_hour,
            window_end_minute: window.end_minute,
            last_refresh_minute: settings.refresh.last_refresh_minute,
        }
    }
}

impl PersistedRecord {
    /// Overlay the present fields onto the defaults.
    pub fn into_settings(self) -> Settings {
        let defaults = Settings::default();
        let inverted = self.inverted.unwrap_or(defaults.inverted);

        // The first revision had only the on/off switch, so a record without a
        // policy means the switch was the policy.
        let invert_policy = self.invert_policy.unwrap_or(if inverted {
            InvertPolicy::On
        } else {
            InvertPolicy::Off
        });

        Settings {
            inverted,
            text_clock_visible: self
                .text_clock_visible
                .unwrap_or(defaults.text_clock_visible),
            hand_order: self.hand_order.unwrap_or(defaults.hand_order),
            invert_policy,
            invert_window: InvertWindow {
                start_hour: in_range(self.window_start_hour, 24),
                start_minute: in_range(self.window_start_minute, 60),
                end_hour: in_range(self.window_end_hour, 24),
                end_minute: in_range(self.window_end_minute, 60),
            },
            refresh: RefreshState {
                last_refresh_minute: self
                    .last_refresh_minute
                    .filter(|minute| *minute < MINUTES_PER_DAY),
            },
        }
    }
}
