//! Host shell that runs the engine against a clock and a companion.
//!
//! It owns resource setup and teardown around the engine loop:
//! - Configuration and settings loading
//! - Simulated time and file logging
//! - Signal handler setup
//! - The stdin reader that turns companion lines into update batches
//! - Saving settings on shutdown
//!
//! `Gaptime` uses a builder pattern for the different startup contexts:
//! - Normal startup: `Gaptime::new(debug_enabled).run()`
//! - Simulation: `Gaptime::new(debug_enabled).with_simulation(start, end, mult).run()`

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::io::{BufRead, Stdout};
use std::sync::mpsc::{Receiver, channel};
use std::thread;

use crate::companion::{JsonLineOutbox, OutboundRequest, Outbox, SunCompanion, UpdateBatch};
use crate::config::Config;
use crate::engine::{Effect, Engine};
use crate::face::Hand;
use crate::io::signals::setup_signal_handler;
use crate::logger::{Log, LoggerGuard};
use crate::settings::{Settings, SettingsStore};
use crate::time::simulate::{SimulationGuards, start_simulation};
use crate::time::source;

/// Where refresh requests go.
enum HostOutbox {
    /// Answered in-process from the configured location.
    Sun(SunCompanion),
    /// Written to stdout for an external companion.
    Lines(JsonLineOutbox<Stdout>),
}

impl Outbox for HostOutbox {
    fn send(&mut self, request: &OutboundRequest) -> Result<()> {
        match self {
            HostOutbox::Sun(companion) => companion.send(request),
            HostOutbox::Lines(lines) => lines.send(request),
        }
    }
}

impl HostOutbox {
    fn from_config(config: &Config) -> Result<Self> {
        match config.coordinates() {
            Some((latitude, longitude)) => Ok(HostOutbox::Sun(SunCompanion::new(
                latitude, longitude,
            )?)),
            None => Ok(HostOutbox::Lines(JsonLineOutbox::stdout())),
        }
    }

    /// Deliver the built-in companion's answer, if one is ready.
    fn take_reply(&mut self, engine: &Engine, now: NaiveDateTime) -> Option<UpdateBatch> {
        let HostOutbox::Sun(companion) = self else {
            return None;
        };
        match companion.take_reply(engine.scheduler().policy(), now.date()) {
            Ok(reply) => reply,
            Err(e) => {
                log_warning!("Sun companion failed: {e:#}");
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SimulationRequest {
    start_time: String,
    end_time: String,
    multiplier: f64,
}

/// Builder for configuring and running the gaptime host.
///
/// # Examples
///
/// ```no_run
/// use gaptime::Gaptime;
///
/// # fn main() -> anyhow::Result<()> {
/// // Normal startup
/// Gaptime::new(false).run()?;
///
/// // One simulated day, as fast as possible
/// Gaptime::new(true)
///     .with_simulation("2024-06-01 00:00:00", "2024-06-02 00:00:00", 0.0)
///     .run()?;
/// # Ok(())
/// # }
/// ```
pub struct Gaptime {
    debug_enabled: bool,
    show_headers: bool,
    log_to_file: bool,
    simulation: Option<SimulationRequest>,
}

impl Gaptime {
    /// Create a new runner with defaults matching normal run
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            show_headers: true,
            log_to_file: false,
            simulation: None,
        }
    }

    /// Skip the version header
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Route output to a log file
    pub fn log_to_file(mut self, enabled: bool) -> Self {
        self.log_to_file = enabled;
        self
    }

    /// Run against a simulated clock instead of the system clock
    pub fn with_simulation(
        mut self,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        multiplier: f64,
    ) -> Self {
        self.simulation = Some(SimulationRequest {
            start_time: start_time.into(),
            end_time: end_time.into(),
            multiplier,
        });
        self
    }

    /// Execute the host with the configured settings.
    ///
    /// Configuration or settings that cannot be loaded abort the start. A
    /// failed save at shutdown is returned after the loop has stopped.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
        }

        let mut simulation_guards: Option<SimulationGuards> = None;
        let mut _logger_guard: Option<LoggerGuard> = None;
        if let Some(sim) = &self.simulation {
            simulation_guards = Some(start_simulation(
                &sim.start_time,
                &sim.end_time,
                sim.multiplier,
                self.log_to_file,
            )?);
        } else if self.log_to_file {
            let log_filename = format!(
                "gaptime-{}.log",
                chrono::Local::now().format("%Y%m%d-%H%M%S")
            );
            log_block_start!("Logging output to: {}", log_filename);
            _logger_guard = Some(Log::start_file_logging(log_filename)?);
        }

        let config = Config::load().context("Configuration failed")?;
        config.log_config();

        let store = SettingsStore::new(config.settings_path()?);
        let settings = store.load().context("Settings could not be loaded")?;
        log_settings(&settings);

        let signal_state = setup_signal_handler(self.debug_enabled)?;
        let inbound = spawn_update_reader();
        let mut outbox = HostOutbox::from_config(&config)?;
        let mut engine = Engine::new(settings);

        log_block_start!("Watchface running");
        present(&engine.startup_effects(), &engine, &config, self.debug_enabled);

        while signal_state.is_running() && !source::simulation_ended() {
            let now = source::now().naive_local();

            while let Ok(batch) = inbound.try_recv() {
                let effects = engine.apply_update(&batch, now);
                present(&effects, &engine, &config, self.debug_enabled);
            }

            let effects = engine.tick(now, &mut outbox);
            present(&effects, &engine, &config, self.debug_enabled);

            if let Some(reply) = outbox.take_reply(&engine, now) {
                let effects = engine.apply_update(&reply, now);
                present(&effects, &engine, &config, self.debug_enabled);
            }

            source::sleep(config.tick_interval());
        }

        store.save(&engine.settings()).with_context(|| {
            format!(
                "Failed to save settings to {}",
                crate::common::paths::private_path(store.path())
            )
        })?;
        log_block_start!("Settings saved");

        if let Some(guards) = simulation_guards.as_mut() {
            guards.complete_simulation();
        }
        log_end!();

        Ok(())
    }
}

/// Read companion batches from stdin, one JSON object per line.
///
/// Lines that do not decode are skipped. The reader stops at end of input; the
/// watchface keeps running without a companion.
fn spawn_update_reader() -> Receiver<UpdateBatch> {
    let (tx, rx) = channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match UpdateBatch::from_json(line) {
                Ok(batch) => {
                    if tx.send(batch).is_err() {
                        break;
                    }
                }
                Err(e) => log_debug!("Ignoring companion line: {e}"),
            }
        }
    });
    rx
}

fn log_settings(settings: &Settings) {
    log_block_start!("Loaded settings");
    log_indented!("Hand order: {}", settings.hand_order);
    log_indented!("Invert policy: {}", settings.invert_policy);
    if settings.invert_policy.uses_window() {
        let window = &settings.invert_window;
        match (window.on_minute(), window.off_minute()) {
            (Some(on), Some(off)) => log_indented!(
                "Window: {:02}:{:02} to {:02}:{:02}",
                on / 60,
                on % 60,
                off / 60,
                off % 60
            ),
            _ => log_indented!("Window: not configured"),
        }
    }
    log_indented!(
        "Text clock: {}",
        if settings.text_clock_visible {
            "shown"
        } else {
            "hidden"
        }
    );
}

/// Stand-in for the display: report what would change on screen.
fn present(effects: &[Effect], engine: &Engine, config: &Config, debug_enabled: bool) {
    let now = config.format_time(source::now().time());
    for effect in effects {
        match effect {
            Effect::SetInverted(_) | Effect::SetTextClockVisible(_) => {
                log_decorated!("{} at {}", effect, now);
            }
            Effect::Redraw(ring) if debug_enabled => {
                if let Some(shown) = engine.layout()[ring.index()]
                    && shown.hand != Hand::Second
                {
                    log_debug!("Ring {}: {:?} at {:#06x}", ring, shown.hand, shown.angle);
                }
            }
            Effect::Redraw(_) => {}
        }
    }
}
