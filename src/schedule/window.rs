//! Daily on/off window for the invert overlay.

use chrono::Timelike;

/// Minutes since local midnight, `0..=1439`.
pub fn minute_of_day<T: Timelike>(time: &T) -> u16 {
    (time.hour() * 60 + time.minute()) as u16
}

/// Start and end of the invert window, each split into hour and minute the way
/// the companion sends them.
///
/// Halves arrive independently, so any of the four may be unset. A bound only
/// counts once both its hour and minute are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvertWindow {
    pub start_hour: Option<u8>,
    pub start_minute: Option<u8>,
    pub end_hour: Option<u8>,
    pub end_minute: Option<u8>,
}

fn bound(hour: Option<u8>, minute: Option<u8>) -> Option<u16> {
    Some(u16::from(hour?) * 60 + u16::from(minute?))
}

impl InvertWindow {
    /// Window with both bounds set, from `(hour, minute)` pairs.
    pub fn between(start: (u8, u8), end: (u8, u8)) -> Self {
        Self {
            start_hour: Some(start.0),
            start_minute: Some(start.1),
            end_hour: Some(end.0),
            end_minute: Some(end.1),
        }
    }

    pub fn on_minute(&self) -> Option<u16> {
        bound(self.start_hour, self.start_minute)
    }

    pub fn off_minute(&self) -> Option<u16> {
        bound(self.end_hour, self.end_minute)
    }

    pub fn is_complete(&self) -> bool {
        self.on_minute().is_some() && self.off_minute().is_some()
    }

    /// `Some(on <= now < off)` once both bounds are known.
    ///
    /// The comparison does not wrap around midnight: a window
    /// whose start is after its end never contains any minute.
    pub fn contains(&self, now_minute: u16) -> Option<bool> {
        let on = self.on_minute()?;
        let off = self.off_minute()?;
        Some(on <= now_minute && now_minute < off)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_minute_of_day() {
        assert_eq!(minute_of_day(&NaiveTime::from_hms_opt(0, 0, 59).unwrap()), 0);
        assert_eq!(minute_of_day(&NaiveTime::from_hms_opt(17, 0, 0).unwrap()), 1020);
        assert_eq!(minute_of_day(&NaiveTime::from_hms_opt(23, 59, 0).unwrap()), 1439);
    }

    #[test]
    fn test_window_is_half_open() {
        let window = InvertWindow::between((8, 0), (17, 0));
        assert_eq!(window.contains(480), Some(true));
        assert_eq!(window.contains(1019), Some(true));
        assert_eq!(window.contains(1020), Some(false));
        assert_eq!(window.contains(479), Some(false));
    }

    #[test]
    fn test_partial_window_is_not_evaluated() {
        let window = InvertWindow {
            start_hour: Some(8),
            start_minute: Some(0),
            end_hour: Some(17),
            end_minute: None,
        };
        assert_eq!(window.on_minute(), Some(480));
        assert_eq!(window.off_minute(), None);
        assert!(!window.is_complete());
        assert_eq!(window.contains(600), None);
    }

    #[test]
    fn test_midnight_crossing_window_never_matches() {
        let window = InvertWindow::between((22, 0), (6, 0));
        assert_eq!(window.contains(23 * 60), Some(false));
        assert_eq!(window.contains(60), Some(false));
    }
}
