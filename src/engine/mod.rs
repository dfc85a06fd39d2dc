//! The watchface engine: one owned aggregate driven by ticks and updates.
//!
//! The host owns a single [`Engine`] and feeds it two kinds of events from one
//! loop:
//!
//! - [`Engine::tick`] with the current wall-clock time, at least once a second
//! - [`Engine::apply_update`] with each batch the companion sends
//!
//! Both return the [`Effect`]s the display has to carry out. Neither blocks:
//! refresh requests are handed to an [`Outbox`] and their answers come back
//! later as ordinary update batches.

mod dispatch;
pub mod effects;

pub use effects::Effect;

use chrono::NaiveDateTime;

use crate::companion::{OutboundRequest, Outbox};
use crate::face::{ClockAngles, HandOrder, Ring, RingHand, TimeUnits};
use crate::schedule::InvertScheduler;
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct Engine {
    hands: HandOrder,
    scheduler: InvertScheduler,
    text_clock_visible: bool,
    angles: ClockAngles,
    last_tick: Option<NaiveDateTime>,
}

impl Engine {
    /// Restore the engine from persisted settings.
    pub fn new(settings: Settings) -> Self {
        Self {
            hands: settings.hand_order,
            scheduler: InvertScheduler::new(
                settings.invert_policy,
                settings.invert_window,
                settings.refresh,
                settings.inverted,
            ),
            text_clock_visible: settings.text_clock_visible,
            angles: ClockAngles::default(),
            last_tick: None,
        }
    }

    /// Snapshot of everything that is persisted.
    pub fn settings(&self) -> Settings {
        Settings {
            inverted: self.scheduler.is_active(),
            text_clock_visible: self.text_clock_visible,
            hand_order: self.hands,
            invert_policy: self.scheduler.policy(),
            invert_window: *self.scheduler.window(),
            refresh: *self.scheduler.refresh(),
        }
    }

    pub fn hand_order(&self) -> &HandOrder {
        &self.hands
    }

    pub fn scheduler(&self) -> &InvertScheduler {
        &self.scheduler
    }

    /// Angles computed by the last tick.
    pub fn angles(&self) -> ClockAngles {
        self.angles
    }

    /// What each ring shows right now.
    pub fn layout(&self) -> [Option<RingHand>; 3] {
        self.hands.layout(&self.angles)
    }

    pub fn is_inverted(&self) -> bool {
        self.scheduler.is_active()
    }

    pub fn text_clock_visible(&self) -> bool {
        self.text_clock_visible
    }

    /// Bring a freshly attached display in line with the restored state.
    pub fn startup_effects(&self) -> Vec<Effect> {
        vec![
            Effect::SetInverted(self.is_inverted()),
            Effect::SetTextClockVisible(self.text_clock_visible),
        ]
    }

    /// Advance to `now`.
    ///
    /// Marks the rings whose hands moved. On a minute change the invert window
    /// is re-evaluated and the refresh throttle consulted. A date change, and
    /// the very first tick, re-anchor a sun window unconditionally; a tick that
    /// is both a date change and a throttled refresh boundary sends a single
    /// request.
    pub fn tick(&mut self, now: NaiveDateTime, outbox: &mut dyn Outbox) -> Vec<Effect> {
        let units = TimeUnits::between(self.last_tick, now);
        if !units.any() {
            return Vec::new();
        }
        self.last_tick = Some(now);
        self.angles = ClockAngles::at(&now);

        let mut dirty = [false; 3];
        for hand in units.hands_to_redraw(&now) {
            for ring in self.hands.rings_for(hand) {
                dirty[ring.index()] = true;
            }
        }
        let mut effects: Vec<Effect> = Ring::ALL
            .into_iter()
            .filter(|ring| dirty[ring.index()])
            .map(Effect::Redraw)
            .collect();

        if !units.minute {
            return effects;
        }

        let outcome = self.scheduler.on_minute(now.time());
        if let Some(active) = outcome.active_changed {
            effects.push(Effect::SetInverted(active));
        }

        if units.day && self.scheduler.on_day_change() {
            Self::request_refresh(outbox, "new day");
        } else if outcome.refresh_requested {
            Self::request_refresh(outbox, "bounds stale");
        }

        effects
    }

    fn request_refresh(outbox: &mut dyn Outbox, reason: &str) {
        log_decorated!("Requesting sun window refresh ({reason})");
        if let Err(e) = outbox.send(&OutboundRequest::RequestRefresh) {
            log_warning!("Refresh request not delivered: {e}");
        }
    }
}
