//! Built-in sun companion.
//!
//! Stands in for the phone-side companion when a location is configured: it
//! answers each refresh request with today's sunrise/sunset window, delivered
//! as an ordinary acknowledgement batch.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};

use super::{OutboundRequest, Outbox, UpdateBatch, UpdateKey};
use crate::schedule::{InvertPolicy, InvertWindow};

/// Sunrise and sunset in UTC for `date` at the given location.
pub fn sun_events_utc(
    latitude: f64,
    longitude: f64,
    date: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let coord = Coordinates::new(latitude, longitude)
        .with_context(|| format!("Invalid coordinates {latitude:.4}°, {longitude:.4}°"))?;
    let solar_day = SolarDay::new(coord, date);
    Ok((
        solar_day.event_time(SolarEvent::Sunrise),
        solar_day.event_time(SolarEvent::Sunset),
    ))
}

fn hour_minute(time: NaiveTime) -> (u8, u8) {
    (time.hour() as u8, time.minute() as u8)
}

/// Window bounds for a sun-anchored policy.
///
/// Sunrise runs from sunrise to sunset. Sunset runs from sunset up to the last
/// minute of the day, so the window never wraps past midnight. The end bound
/// is exclusive: 23:59 itself shows the face uninverted.
pub fn window_for(
    policy: InvertPolicy,
    sunrise: NaiveTime,
    sunset: NaiveTime,
) -> Option<InvertWindow> {
    match policy {
        InvertPolicy::SunriseWindow => {
            Some(InvertWindow::between(hour_minute(sunrise), hour_minute(sunset)))
        }
        InvertPolicy::SunsetWindow => Some(InvertWindow::between(hour_minute(sunset), (23, 59))),
        InvertPolicy::Off | InvertPolicy::On | InvertPolicy::FixedWindow => None,
    }
}

/// Acknowledgement batch carrying a complete window.
pub fn ack_batch(window: &InvertWindow) -> UpdateBatch {
    let mut batch = UpdateBatch::new();
    let bounds = [
        (UpdateKey::WindowStartHour, window.start_hour),
        (UpdateKey::WindowStartMinute, window.start_minute),
        (UpdateKey::WindowEndHour, window.end_hour),
        (UpdateKey::WindowEndMinute, window.end_minute),
    ];
    for (key, value) in bounds {
        if let Some(value) = value {
            batch.push(key.name(), value);
        }
    }
    batch.push(UpdateKey::RefreshAck.name(), ());
    batch
}

/// Outbox that computes the answer itself.
#[derive(Debug, Clone)]
pub struct SunCompanion {
    latitude: f64,
    longitude: f64,
    pending: bool,
}

impl SunCompanion {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        Coordinates::new(latitude, longitude)
            .with_context(|| format!("Invalid coordinates {latitude:.4}°, {longitude:.4}°"))?;
        Ok(Self {
            latitude,
            longitude,
            pending: false,
        })
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }

    /// Answer the pending request, if any, for the current policy.
    ///
    /// Sun times are converted to local wall time before they become window
    /// bounds. A request that arrives while a non-sun policy is active is
    /// dropped without an answer.
    pub fn take_reply(
        &mut self,
        policy: InvertPolicy,
        date: NaiveDate,
    ) -> Result<Option<UpdateBatch>> {
        if !std::mem::take(&mut self.pending) {
            return Ok(None);
        }

        let (sunrise_utc, sunset_utc) = sun_events_utc(self.latitude, self.longitude, date)?;
        let sunrise = sunrise_utc.with_timezone(&Local).time();
        let sunset = sunset_utc.with_timezone(&Local).time();

        log_debug!(
            "Sun times for {}: sunrise {}, sunset {}",
            date,
            sunrise.format("%H:%M"),
            sunset.format("%H:%M")
        );

        Ok(window_for(policy, sunrise, sunset).map(|window| ack_batch(&window)))
    }
}

impl Outbox for SunCompanion {
    fn send(&mut self, request: &OutboundRequest) -> Result<()> {
        match request {
            OutboundRequest::RequestRefresh => self.pending = true,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_sunrise_window_spans_daylight() {
        let window = window_for(InvertPolicy::SunriseWindow, hm(6, 12), hm(19, 48)).unwrap();
        assert_eq!(window, InvertWindow::between((6, 12), (19, 48)));
    }

    #[test]
    fn test_sunset_window_ends_before_midnight() {
        let window = window_for(InvertPolicy::SunsetWindow, hm(6, 12), hm(19, 48)).unwrap();
        assert_eq!(window.on_minute(), Some(19 * 60 + 48));
        assert_eq!(window.off_minute(), Some(1439));
    }

    #[test]
    fn test_sunset_window_releases_last_minute() {
        let window = window_for(InvertPolicy::SunsetWindow, hm(6, 12), hm(19, 48)).unwrap();
        assert_eq!(window.contains(23 * 60 + 58), Some(true));
        assert_eq!(window.contains(23 * 60 + 59), Some(false));
    }

    #[test]
    fn test_no_window_for_other_policies() {
        for policy in [InvertPolicy::Off, InvertPolicy::On, InvertPolicy::FixedWindow] {
            assert_eq!(window_for(policy, hm(6, 0), hm(18, 0)), None);
        }
    }

    #[test]
    fn test_ack_batch_layout() {
        let batch = ack_batch(&InvertWindow::between((6, 5), (20, 30)));
        let keys: Vec<&str> = batch.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "windowStartHour",
                "windowStartMinute",
                "windowEndHour",
                "windowEndMinute",
                "refreshAck"
            ]
        );
        assert_eq!(batch.entries()[3].value.as_u8(), Some(30));
    }

    #[test]
    fn test_equator_equinox_sunrise_near_six_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let (sunrise, sunset) = sun_events_utc(0.0, 0.0, date).unwrap();
        assert!((5..=6).contains(&sunrise.hour()), "sunrise at {sunrise}");
        assert!((17..=18).contains(&sunset.hour()), "sunset at {sunset}");
        assert!(sunrise < sunset);
    }

    #[test]
    fn test_invalid_coordinates_are_rejected() {
        assert!(SunCompanion::new(91.0, 0.0).is_err());
        assert!(SunCompanion::new(0.0, 181.0).is_err());
    }

    #[test]
    fn test_reply_only_after_request() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut companion = SunCompanion::new(52.52, 13.405).unwrap();
        assert!(
            companion
                .take_reply(InvertPolicy::SunriseWindow, date)
                .unwrap()
                .is_none()
        );

        companion.send(&OutboundRequest::RequestRefresh).unwrap();
        assert!(companion.has_pending());
        let reply = companion
            .take_reply(InvertPolicy::SunriseWindow, date)
            .unwrap()
            .unwrap();
        assert_eq!(reply.len(), 5);
        assert!(!companion.has_pending());
    }

    #[test]
    fn test_request_under_manual_policy_is_dropped() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut companion = SunCompanion::new(52.52, 13.405).unwrap();
        companion.send(&OutboundRequest::RequestRefresh).unwrap();
        assert!(companion.take_reply(InvertPolicy::On, date).unwrap().is_none());
        assert!(!companion.has_pending());
    }
}
