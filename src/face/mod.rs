//! Analog face geometry: which angle each hand points at and which ring shows it.
//!
//! ## Key Functionality
//! - **Angles**: fixed-point hand angles for a wall-clock time ([`angles`])
//! - **Redraw planning**: which time units changed between two ticks
//! - **Hand order**: the hand-to-ring indirection table ([`hands`])
//!
//! Nothing here draws. The renderer asks for a [`RingHand`] per ring and turns
//! it into pixels.

pub mod angles;
pub mod hands;

pub use angles::{ClockAngles, TimeUnits};
pub use hands::{Hand, HandOrder, Ring, RingHand};
