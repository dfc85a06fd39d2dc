//! Simulated-time runs.
//!
//! `--simulate START END [MULT]` replaces the real clock with a
//! [`SimulatedTimeSource`] so a whole day of window edges, refresh boundaries
//! and midnight re-anchors can be watched in minutes. With `--log` the output
//! goes to a timestamped file in the working directory.

use anyhow::Result;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;

use crate::logger::{Log, LoggerGuard};
use crate::time::source::{SimulatedTimeSource, init_time_source, parse_datetime};

/// Keeps the file logger alive for the length of a simulation and closes the
/// terminal output once it ends.
pub struct SimulationGuards {
    logger_guard: Option<LoggerGuard>,
    log_to_file: bool,
    is_complete: bool,
}

impl SimulationGuards {
    /// Flush the log file and report completion on the terminal.
    pub fn complete_simulation(&mut self) {
        self.is_complete = true;
        self.finish("Simulation complete");
    }

    fn finish(&mut self, message: &str) {
        if self.log_to_file {
            drop(self.logger_guard.take());

            // Give the writer thread a moment to flush before printing to the terminal
            std::thread::sleep(Duration::from_millis(100));

            println!("┣ {message}");
            println!("╹");
        }
    }
}

impl Drop for SimulationGuards {
    fn drop(&mut self) {
        if !self.is_complete {
            self.finish("Simulation interrupted");
        }
    }
}

/// Install the simulated clock and, with `log_to_file`, route output to a file.
pub fn start_simulation(
    start_time: &str,
    end_time: &str,
    multiplier: f64,
    log_to_file: bool,
) -> Result<SimulationGuards> {
    let start =
        parse_datetime(start_time).map_err(|e| anyhow::anyhow!("Invalid start time: {}", e))?;
    let end = parse_datetime(end_time).map_err(|e| anyhow::anyhow!("Invalid end time: {}", e))?;

    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    log_block_start!("Simulation Mode");
    log_indented!("From: {}", start.format("%Y-%m-%d %H:%M:%S"));
    log_indented!("To:   {}", end.format("%Y-%m-%d %H:%M:%S"));
    if multiplier == 0.0 {
        log_indented!("Speed: fast-forward");
    } else {
        log_indented!("Speed: {}x", multiplier);
    }

    let mut logger_guard = None;
    if log_to_file {
        let log_filename = format!(
            "gaptime-simulation-{}.log",
            Local::now().format("%Y%m%d-%H%M%S")
        );
        log_block_start!("Logging simulation output to: {}", log_filename);
        logger_guard = Some(Log::start_file_logging(log_filename)?);
    }

    init_time_source(Arc::new(SimulatedTimeSource::new(start, end, multiplier)));

    Ok(SimulationGuards {
        logger_guard,
        log_to_file,
        is_complete: false,
    })
}
