//! Throttling for sunrise/sunset refresh requests.

use crate::common::constants::{
    MINUTES_PER_DAY, REFRESH_STALE_AFTER_MINUTES, REFRESH_THROTTLE_MINUTES,
};

/// When the sun-anchored window bounds were last refreshed.
///
/// `None` means never, which makes the next 20-minute boundary request bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshState {
    pub last_refresh_minute: Option<u16>,
}

impl RefreshState {
    pub fn is_valid(&self) -> bool {
        self.last_refresh_minute.is_some()
    }

    /// Whether a minute tick at `now_minute` should ask for fresh bounds.
    ///
    /// Requests only go out on 20-minute boundaries, and only when bounds were
    /// never refreshed or the last refresh is an hour old. The age wraps at
    /// midnight, so a refresh from late yesterday ages into today and an
    /// unanswered day-boundary request is retried.
    pub fn is_due(&self, now_minute: u16) -> bool {
        if now_minute % REFRESH_THROTTLE_MINUTES != 0 {
            return false;
        }
        match self.last_refresh_minute {
            None => true,
            Some(last) => {
                let age = (i32::from(now_minute) - i32::from(last))
                    .rem_euclid(i32::from(MINUTES_PER_DAY));
                age >= REFRESH_STALE_AFTER_MINUTES
            }
        }
    }

    /// Forget the last refresh so the next boundary asks again.
    pub fn invalidate(&mut self) {
        self.last_refresh_minute = None;
    }

    pub fn record(&mut self, now_minute: u16) {
        self.last_refresh_minute = Some(now_minute);
    }
}
