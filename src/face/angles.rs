//! Time-to-angle conversion.
//!
//! Angles are fractions of a turn in `0..TRIG_MAX_ANGLE`, with 0 at 12 o'clock.
//! The hour hand steps every ten minutes so it visibly creeps between hour
//! marks instead of jumping on the hour.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::common::constants::{
    HOUR_HAND_CREEP_MINUTES, HOUR_HAND_STEPS, MINUTES_PER_HOUR, SECONDS_PER_MINUTE,
    TRIG_MAX_ANGLE,
};
use crate::face::hands::Hand;

/// Hand angles for one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockAngles {
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

/// `TRIG_MAX_ANGLE * numerator / denominator`, with `numerator < denominator`
/// so the result always fits below one full turn.
fn turn_fraction(numerator: u32, denominator: u32) -> u16 {
    (TRIG_MAX_ANGLE * numerator / denominator) as u16
}

impl ClockAngles {
    pub fn at<T: Timelike>(time: &T) -> Self {
        let hour_step = (time.hour() % 12) * 6 + time.minute() / HOUR_HAND_CREEP_MINUTES;
        Self {
            hour: turn_fraction(hour_step, HOUR_HAND_STEPS),
            minute: turn_fraction(time.minute(), MINUTES_PER_HOUR),
            second: turn_fraction(time.second(), SECONDS_PER_MINUTE),
        }
    }

    pub fn for_hand(&self, hand: Hand) -> u16 {
        match hand {
            Hand::Hour => self.hour,
            Hand::Minute => self.minute,
            Hand::Second => self.second,
        }
    }
}

/// Time units that changed since the previous tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeUnits {
    pub second: bool,
    pub minute: bool,
    pub hour: bool,
    pub day: bool,
}

impl TimeUnits {
    pub const ALL: TimeUnits = TimeUnits {
        second: true,
        minute: true,
        hour: true,
        day: true,
    };

    /// Compare two tick timestamps. The first tick (`previous == None`)
    /// reports every unit as changed so the whole face gets drawn.
    ///
    /// A coarser unit changing implies every finer one changed too, which also
    /// covers jumps (suspend, clock adjustments) that land on the same second
    /// of a different minute.
    pub fn between(previous: Option<NaiveDateTime>, now: NaiveDateTime) -> Self {
        let Some(prev) = previous else {
            return Self::ALL;
        };

        let day = prev.date() != now.date();
        let hour = day || prev.hour() != now.hour();
        let minute = hour || prev.minute() != now.minute();
        let second = minute || prev.second() != now.second();

        Self {
            second,
            minute,
            hour,
            day,
        }
    }

    pub fn any(&self) -> bool {
        self.second || self.minute || self.hour || self.day
    }

    /// Hands whose angle may differ from the previous tick.
    ///
    /// The hour angle also moves on every ten-minute boundary.
    pub fn hands_to_redraw<T: Timelike>(&self, now: &T) -> Vec<Hand> {
        let mut hands = Vec::with_capacity(3);
        if self.second {
            hands.push(Hand::Second);
        }
        if self.minute {
            hands.push(Hand::Minute);
        }
        if self.hour || (self.minute && now.minute() % HOUR_HAND_CREEP_MINUTES == 0) {
            hands.push(Hand::Hour);
        }
        hands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use proptest::prelude::*;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn dt(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_cardinal_angles() {
        let angles = ClockAngles::at(&t(3, 15, 45));
        assert_eq!(angles.minute, 0x4000);
        assert_eq!(angles.second, 0xC000);
        // 3:15 is one ten-minute step past three o'clock
        assert_eq!(angles.hour, turn_fraction(19, 72));
    }

    #[test]
    fn test_midnight_and_noon_are_zero() {
        assert_eq!(ClockAngles::at(&t(0, 0, 0)), ClockAngles::default());
        assert_eq!(ClockAngles::at(&t(12, 0, 0)), ClockAngles::default());
    }

    #[test]
    fn test_hour_hand_creeps_in_ten_minute_steps() {
        assert_eq!(ClockAngles::at(&t(6, 9, 0)).hour, ClockAngles::at(&t(6, 0, 0)).hour);
        assert!(ClockAngles::at(&t(6, 10, 0)).hour > ClockAngles::at(&t(6, 9, 59)).hour);
        assert_eq!(ClockAngles::at(&t(6, 0, 0)).hour, 0x8000);
    }

    #[test]
    fn test_minute_wraps_to_zero_not_negative() {
        let before = ClockAngles::at(&t(10, 59, 59));
        let after = ClockAngles::at(&t(11, 0, 0));
        assert_eq!(before.minute, turn_fraction(59, 60));
        assert_eq!(after.minute, 0);
        assert_eq!(before.second, turn_fraction(59, 60));
        assert_eq!(after.second, 0);
    }

    #[test]
    fn test_first_tick_changes_everything() {
        assert_eq!(TimeUnits::between(None, dt(1, 8, 0, 0)), TimeUnits::ALL);
    }

    #[test]
    fn test_second_tick_only_changes_seconds() {
        let units = TimeUnits::between(Some(dt(1, 8, 1, 1)), dt(1, 8, 1, 2));
        assert!(units.second && !units.minute && !units.hour && !units.day);
        assert_eq!(units.hands_to_redraw(&dt(1, 8, 1, 2)), vec![Hand::Second]);
    }

    #[test]
    fn test_ten_minute_boundary_redraws_hour_hand() {
        let now = dt(1, 8, 20, 0);
        let units = TimeUnits::between(Some(dt(1, 8, 19, 59)), now);
        assert!(units.minute && !units.hour);
        assert_eq!(
            units.hands_to_redraw(&now),
            vec![Hand::Second, Hand::Minute, Hand::Hour]
        );

        let now = dt(1, 8, 21, 0);
        let units = TimeUnits::between(Some(dt(1, 8, 20, 59)), now);
        assert_eq!(units.hands_to_redraw(&now), vec![Hand::Second, Hand::Minute]);
    }

    #[test]
    fn test_date_change_cascades() {
        let units = TimeUnits::between(Some(dt(1, 23, 59, 59)), dt(2, 0, 0, 0));
        assert_eq!(units, TimeUnits::ALL);
    }

    #[test]
    fn test_jump_to_same_second_of_other_day_is_seen() {
        let units = TimeUnits::between(Some(dt(1, 9, 30, 5)), dt(2, 9, 30, 5));
        assert!(units.day && units.minute && units.second);
    }

    proptest! {
        /// Within an hour the minute and second angles never decrease, and
        /// within a 12-hour half-day the hour angle never decreases.
        #[test]
        fn prop_angles_monotonic_between_rollovers(
            h in 0u32..12, m in 0u32..60, s in 0u32..59
        ) {
            let a = ClockAngles::at(&t(h, m, s));
            let b = ClockAngles::at(&t(h, m, s + 1));
            prop_assert!(b.second > a.second);
            prop_assert_eq!(b.minute, a.minute);
            prop_assert!(b.hour >= a.hour);
        }

        #[test]
        fn prop_angles_stay_below_one_turn(h in 0u32..24, m in 0u32..60, s in 0u32..60) {
            let a = ClockAngles::at(&t(h, m, s));
            prop_assert!(u32::from(a.hour) < TRIG_MAX_ANGLE);
            prop_assert!(u32::from(a.minute) < TRIG_MAX_ANGLE);
            prop_assert!(u32::from(a.second) < TRIG_MAX_ANGLE);
        }

        #[test]
        fn prop_afternoon_mirrors_morning(h in 0u32..12, m in 0u32..60, s in 0u32..60) {
            prop_assert_eq!(ClockAngles::at(&t(h, m, s)), ClockAngles::at(&t(h + 12, m, s)));
        }
    }
}
