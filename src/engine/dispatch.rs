//! Applying companion update batches to the engine.

use chrono::NaiveDateTime;

use super::{Effect, Engine};
use crate::companion::{EntryValue, UpdateBatch, UpdateEntry, UpdateKey};
use crate::face::{HandOrder, Ring};
use crate::schedule::InvertPolicy;

/// Store `value` in `slot` if it is a byte below `limit`.
fn store_bound(slot: &mut Option<u8>, value: &EntryValue, limit: u8) -> bool {
    match value.as_u8().filter(|v| *v < limit) {
        Some(v) => {
            *slot = Some(v);
            true
        }
        None => false,
    }
}

/// Store an `"HH:MM"` bound into its hour and minute slots.
fn store_clock_bound(hour: &mut Option<u8>, minute: &mut Option<u8>, value: &EntryValue) -> bool {
    match value.as_clock_time().filter(|(h, m)| *h < 24 && *m < 60) {
        Some((h, m)) => {
            *hour = Some(h);
            *minute = Some(m);
            true
        }
        None => false,
    }
}

fn ignore(entry: &UpdateEntry) {
    log_debug!("Ignoring update {} = {:?}", entry.key, entry.value);
}

impl Engine {
    /// Apply one inbound batch.
    ///
    /// Entries apply in order, so a later entry for a key overwrites an earlier
    /// one. Unknown keys and values that do not fit their key are skipped. A
    /// `refreshAck` anywhere in the batch stamps the refresh time with `now`
    /// once all bounds in the batch are stored. Afterwards `On`/`Off` force
    /// their flag; windowed policies wait for the next minute tick.
    ///
    /// Applying the same batch again leaves the state unchanged.
    pub fn apply_update(&mut self, batch: &UpdateBatch, now: NaiveDateTime) -> Vec<Effect> {
        let inverted_before = self.scheduler.is_active();
        let mut text_clock = None;
        let mut hands_assigned = false;
        let mut acknowledged = false;

        for entry in batch.entries() {
            let Some(key) = entry.key() else {
                ignore(entry);
                continue;
            };

            let applied = match key {
                UpdateKey::InvertPolicy => {
                    match entry.value.as_text().and_then(InvertPolicy::from_wire) {
                        Some(policy) => {
                            self.scheduler.set_policy(policy);
                            true
                        }
                        None => false,
                    }
                }
                UpdateKey::TextClockVisible => match entry.value.as_switch() {
                    Some(visible) => {
                        self.text_clock_visible = visible;
                        text_clock = Some(visible);
                        true
                    }
                    None => false,
                },
                UpdateKey::HandOrder => match entry.value.as_text() {
                    Some(text) => {
                        self.hands = HandOrder::parse(text);
                        hands_assigned = true;
                        true
                    }
                    None => false,
                },
                UpdateKey::WindowStartHour => {
                    store_bound(&mut self.scheduler.window_mut().start_hour, &entry.value, 24)
                }
                UpdateKey::WindowStartMinute => {
                    store_bound(&mut self.scheduler.window_mut().start_minute, &entry.value, 60)
                }
                UpdateKey::WindowEndHour => {
                    store_bound(&mut self.scheduler.window_mut().end_hour, &entry.value, 24)
                }
                UpdateKey::WindowEndMinute => {
                    store_bound(&mut self.scheduler.window_mut().end_minute, &entry.value, 60)
                }
                UpdateKey::WindowStart => {
                    let window = self.scheduler.window_mut();
                    store_clock_bound(&mut window.start_hour, &mut window.start_minute, &entry.value)
                }
                UpdateKey::WindowEnd => {
                    let window = self.scheduler.window_mut();
                    store_clock_bound(&mut window.end_hour, &mut window.end_minute, &entry.value)
                }
                UpdateKey::RefreshAck => {
                    acknowledged = true;
                    true
                }
            };

            if !applied {
                ignore(entry);
            }
        }

        if acknowledged {
            self.scheduler.acknowledge_refresh(now.time());
            let window = self.scheduler.window();
            log_decorated!(
                "Sun window refreshed at {}: {} to {}",
                now.format("%H:%M"),
                format_minute(window.on_minute()),
                format_minute(window.off_minute())
            );
        }

        self.scheduler.apply_manual_policy();

        let mut effects = Vec::new();
        if self.scheduler.is_active() != inverted_before {
            effects.push(Effect::SetInverted(self.scheduler.is_active()));
        }
        if let Some(visible) = text_clock {
            effects.push(Effect::SetTextClockVisible(visible));
        }
        if hands_assigned {
            log_decorated!("Hand order: {}", self.hands);
            effects.extend(Ring::ALL.map(Effect::Redraw));
        }
        effects
    }
}

fn format_minute(minute: Option<u16>) -> String {
    match minute {
        Some(minute) => format!("{:02}:{:02}", minute / 60, minute % 60),
        None => "unset".to_string(),
    }
}
