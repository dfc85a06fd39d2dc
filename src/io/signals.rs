//! Shutdown signal handling for the host loop.
//!
//! SIGINT, SIGTERM and SIGHUP all ask for a graceful shutdown: the loop
//! finishes its current iteration, saves settings and exits.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

/// Signal handling state shared between threads
pub struct SignalState {
    /// Atomic flag indicating if the application should keep running
    pub running: Arc<AtomicBool>,
}

impl SignalState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the loop to stop, as a signal would.
    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn describe(signal: i32, debug_enabled: bool) -> &'static str {
    match signal {
        SIGINT if debug_enabled => "Received SIGINT (Ctrl+C), initiating graceful shutdown...",
        SIGINT => "Received interrupt signal, initiating graceful shutdown...",
        SIGTERM => "Received termination request, initiating graceful shutdown...",
        SIGHUP => "Received hangup signal, initiating graceful shutdown...",
        _ => "Received shutdown signal, initiating graceful shutdown...",
    }
}

/// Install the handler thread and return the shared running flag.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    let running_clone = running.clone();

    thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            log_pipe!();
            log_info!("{}", describe(sig, debug_enabled));
            running_clone.store(false, Ordering::SeqCst);
        }
    });

    Ok(SignalState { running })
}
