//! # Gaptime Library
//!
//! Logic core of a multi-ring analog watchface, plus the host shell that
//! drives it from the command line.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Gaptime` builder owns startup, the run loop and shutdown
//! - **Engine**: `engine` holds the watchface state and turns ticks and update
//!   batches into display effects
//! - **Face**: `face` converts wall-clock time into hand angles and maps hands
//!   onto rings
//! - **Schedule**: `schedule` decides when the face is inverted and when to ask
//!   for fresh sunrise/sunset bounds
//! - **Companion**: `companion` carries the update protocol, the outbound
//!   request channel and an in-process sunrise/sunset source
//! - **Persistence**: `settings` stores the durable record between runs
//! - **Infrastructure**: configuration, signals, simulated time and logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod common;
pub mod companion;
pub mod config;
pub mod engine;
pub mod face;
pub mod io;
pub mod schedule;
pub mod settings;
pub mod time;
mod watchface;

pub use companion::{OutboundRequest, Outbox, UpdateBatch};
pub use engine::{Effect, Engine};
pub use face::{ClockAngles, HandOrder};
pub use schedule::InvertPolicy;
pub use settings::{Settings, SettingsStore};
pub use watchface::Gaptime;
