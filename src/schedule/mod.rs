//! Invert overlay scheduling.
//!
//! The overlay is either switched manually (`On`/`Off`) or follows a daily
//! window. The window is fixed by the user (`FixedWindow`) or anchored to
//! sunrise/sunset times that only the companion can compute
//! (`SunriseWindow`/`SunsetWindow`). For the sun-anchored policies the
//! scheduler also decides when to ask the companion for fresh bounds.
//!
//! ## Transitions
//! - **Policy change**: immediate. `On`/`Off` apply their flag right away;
//!   windowed policies wait for the next minute tick.
//! - **Minute tick**: windowed policies re-evaluate `on <= now < off`; sun
//!   policies also run the refresh throttle.
//! - **Day change**: sun policies always request fresh bounds.
//! - **Refresh acknowledgement**: records when bounds were last refreshed.

pub mod refresh;
pub mod window;

pub use refresh::RefreshState;
pub use window::{InvertWindow, minute_of_day};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the invert overlay decides whether it is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvertPolicy {
    /// Never inverted.
    #[default]
    Off,
    /// Always inverted.
    On,
    /// Inverted inside a user-chosen daily window.
    FixedWindow,
    /// Inverted inside a window anchored to sunrise.
    SunriseWindow,
    /// Inverted inside a window anchored to sunset.
    SunsetWindow,
}

impl InvertPolicy {
    /// Parse the companion's policy text (`on`, `off`, `time`, `sunrise`, `sunset`).
    pub fn from_wire(text: &str) -> Option<Self> {
        match text {
            "off" => Some(Self::Off),
            "on" => Some(Self::On),
            "time" => Some(Self::FixedWindow),
            "sunrise" => Some(Self::SunriseWindow),
            "sunset" => Some(Self::SunsetWindow),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::FixedWindow => "time",
            Self::SunriseWindow => "sunrise",
            Self::SunsetWindow => "sunset",
        }
    }

    /// The flag a manual policy forces, `None` for windowed policies.
    pub fn manual_flag(&self) -> Option<bool> {
        match self {
            Self::Off => Some(false),
            Self::On => Some(true),
            Self::FixedWindow | Self::SunriseWindow | Self::SunsetWindow => None,
        }
    }

    pub fn uses_window(&self) -> bool {
        self.manual_flag().is_none()
    }

    /// Whether the window bounds come from the companion's sun calculation.
    pub fn uses_refresh(&self) -> bool {
        matches!(self, Self::SunriseWindow | Self::SunsetWindow)
    }
}

impl fmt::Display for InvertPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// What a minute tick decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MinuteOutcome {
    /// New invert flag, when it changed.
    pub active_changed: Option<bool>,
    /// Whether fresh sunrise/sunset bounds should be requested.
    pub refresh_requested: bool,
}

/// Invert policy state machine with its window and refresh bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvertScheduler {
    policy: InvertPolicy,
    window: InvertWindow,
    refresh: RefreshState,
    active: bool,
}

impl InvertScheduler {
    /// Restore a scheduler from persisted parts.
    ///
    /// `active` is the last known flag. Manual policies override it; windowed
    /// policies keep it until their next minute tick.
    pub fn new(
        policy: InvertPolicy,
        window: InvertWindow,
        refresh: RefreshState,
        active: bool,
    ) -> Self {
        Self {
            policy,
            window,
            refresh,
            active: policy.manual_flag().unwrap_or(active),
        }
    }

    pub fn policy(&self) -> InvertPolicy {
        self.policy
    }

    pub fn window(&self) -> &InvertWindow {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut InvertWindow {
        &mut self.window
    }

    pub fn refresh(&self) -> &RefreshState {
        &self.refresh
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) -> Option<bool> {
        if self.active == active {
            None
        } else {
            self.active = active;
            Some(active)
        }
    }

    /// Switch policy. Returns the new flag if a manual policy changed it.
    ///
    /// Entering a sun policy from any other policy forgets the last refresh:
    /// the stored bounds were not anchored to this sun event.
    pub fn set_policy(&mut self, policy: InvertPolicy) -> Option<bool> {
        if self.policy != policy {
            log_decorated!("Invert policy: {} → {}", self.policy, policy);
            if policy.uses_refresh() {
                self.refresh.invalidate();
            }
            self.policy = policy;
        }
        self.apply_manual_policy()
    }

    /// Force the flag of a manual policy. No-op for windowed policies.
    pub fn apply_manual_policy(&mut self) -> Option<bool> {
        self.policy
            .manual_flag()
            .and_then(|flag| self.set_active(flag))
    }

    /// Evaluate the window and the refresh throttle for a minute tick.
    pub fn on_minute(&mut self, now: NaiveTime) -> MinuteOutcome {
        if !self.policy.uses_window() {
            return MinuteOutcome::default();
        }

        let now_minute = minute_of_day(&now);
        let active_changed = self
            .window
            .contains(now_minute)
            .and_then(|active| self.set_active(active));

        let refresh_requested = self.policy.uses_refresh() && self.refresh.is_due(now_minute);

        MinuteOutcome {
            active_changed,
            refresh_requested,
        }
    }

    /// Day boundary: sun policies always re-anchor their window.
    pub fn on_day_change(&self) -> bool {
        self.policy.uses_refresh()
    }

    /// Fresh bounds arrived; remember when.
    pub fn acknowledge_refresh(&mut self, now: NaiveTime) {
        self.refresh.record(minute_of_day(&now));
    }
}
