//! Wall-clock access for the host loop.
//!
//! The engine itself never reads the clock; the host passes timestamps into
//! `Engine::tick`. This module supplies those timestamps, either from the
//! system clock or from an accelerated simulation.

pub mod simulate;
pub mod source;
