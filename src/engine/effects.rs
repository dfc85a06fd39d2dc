use std::fmt;

use crate::face::Ring;

/// Something the display shell has to do after an engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Ring content changed and must be redrawn.
    Redraw(Ring),
    /// Invert overlay switched.
    SetInverted(bool),
    /// Text clock shown or hidden.
    SetTextClockVisible(bool),
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Redraw(ring) => write!(f, "redraw {ring} ring"),
            Effect::SetInverted(true) => write!(f, "invert on"),
            Effect::SetInverted(false) => write!(f, "invert off"),
            Effect::SetTextClockVisible(true) => write!(f, "show text clock"),
            Effect::SetTextClockVisible(false) => write!(f, "hide text clock"),
        }
    }
}
