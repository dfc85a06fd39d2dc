//! Time source abstraction for real and simulated time.
//!
//! Simulation lets a whole day of ticks (window edges, 20-minute refresh
//! boundaries, the midnight re-anchor) play out in seconds.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, TimeZone};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration as StdDuration;

static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current local time
    fn now(&self) -> DateTime<Local>;

    /// Sleep for the specified duration (or simulate it)
    fn sleep(&self, duration: StdDuration);

    fn is_simulated(&self) -> bool;

    /// Whether a simulation has reached its end time (always false for real time)
    fn is_ended(&self) -> bool {
        false
    }
}

/// System clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Simulated clock running from `start` to `end`.
///
/// With a positive multiplier each `sleep` takes `duration / multiplier` of real
/// time. A multiplier of `0.0` is fast-forward: sleeps advance the clock
/// instantly.
pub struct SimulatedTimeSource {
    end_time: DateTime<Local>,
    multiplier: f64,
    current: Mutex<DateTime<Local>>,
}

impl SimulatedTimeSource {
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>, multiplier: f64) -> Self {
        let multiplier = if multiplier < 0.0 {
            crate::common::constants::DEFAULT_SIMULATION_MULTIPLIER
        } else {
            multiplier
        };
        Self {
            end_time,
            multiplier,
            current: Mutex::new(start_time.min(end_time)),
        }
    }

    fn current(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        self.current()
    }

    fn sleep(&self, duration: StdDuration) {
        let remaining = self.end_time - self.current();
        let step = ChronoDuration::from_std(duration)
            .unwrap_or(remaining)
            .min(remaining);
        if step <= ChronoDuration::zero() {
            return;
        }

        if self.multiplier == 0.0 {
            // Let the logger thread and stdin reader make progress
            std::thread::sleep(StdDuration::from_millis(1));
        } else if let Ok(real) = step.to_std() {
            std::thread::sleep(real.div_f64(self.multiplier));
        }

        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = (*current + step).min(self.end_time);
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.current() >= self.end_time
    }
}

/// Install the process-wide time source. Only the first call has an effect.
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

fn source() -> &'static Arc<dyn TimeSource> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource))
}

pub fn now() -> DateTime<Local> {
    source().now()
}

pub fn sleep(duration: StdDuration) {
    source().sleep(duration)
}

pub fn is_simulated() -> bool {
    source().is_simulated()
}

pub fn simulation_ended() -> bool {
    source().is_ended()
}

/// Parse a datetime string in the format "YYYY-MM-DD HH:MM:SS" as local time.
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))?;
    Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| "Ambiguous or invalid local time".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Local> {
        parse_datetime(s).unwrap()
    }

    #[test]
    fn test_fast_forward_advances_without_waiting() {
        let source = SimulatedTimeSource::new(
            at("2024-06-01 23:59:00"),
            at("2024-06-02 00:10:00"),
            0.0,
        );
        source.sleep(StdDuration::from_secs(90));
        assert_eq!(source.now(), at("2024-06-02 00:00:30"));
        assert!(!source.is_ended());
    }

    #[test]
    fn test_simulation_caps_at_end_time() {
        let source = SimulatedTimeSource::new(
            at("2024-06-01 12:00:00"),
            at("2024-06-01 12:01:00"),
            0.0,
        );
        source.sleep(StdDuration::from_secs(3600));
        assert_eq!(source.now(), at("2024-06-01 12:01:00"));
        assert!(source.is_ended());
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("yesterday").is_err());
        assert!(parse_datetime("2024-06-01 25:00:00").is_err());
    }
}
