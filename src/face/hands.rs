//! Hand-to-ring indirection.
//!
//! The face has three concentric rings. A [`HandOrder`] says which hand each
//! ring shows, outer to inner. A hand missing from the order is still computed
//! but shown on no ring.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::common::constants::DEFAULT_HAND_ORDER;
use crate::face::angles::ClockAngles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Second,
    Minute,
    Hour,
}

impl Hand {
    pub const ALL: [Hand; 3] = [Hand::Second, Hand::Minute, Hand::Hour];

    /// Parse a single hand-order character (`S`, `M`, `H`, any case).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'S' => Some(Hand::Second),
            'M' => Some(Hand::Minute),
            'H' => Some(Hand::Hour),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Hand::Second => 'S',
            Hand::Minute => 'M',
            Hand::Hour => 'H',
        }
    }
}

/// Physical ring position, outer to inner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ring {
    Outer,
    Middle,
    Inner,
}

impl Ring {
    pub const ALL: [Ring; 3] = [Ring::Outer, Ring::Middle, Ring::Inner];

    pub fn index(&self) -> usize {
        match self {
            Ring::Outer => 0,
            Ring::Middle => 1,
            Ring::Inner => 2,
        }
    }
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ring::Outer => write!(f, "outer"),
            Ring::Middle => write!(f, "middle"),
            Ring::Inner => write!(f, "inner"),
        }
    }
}

/// What a ring shows for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingHand {
    pub ring: Ring,
    pub hand: Hand,
    pub angle: u16,
}

/// Three slots, outer to inner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandOrder {
    slots: [Option<Hand>; 3],
}

impl Default for HandOrder {
    /// Second outermost, hour innermost.
    fn default() -> Self {
        Self::parse(DEFAULT_HAND_ORDER)
    }
}

impl HandOrder {
    pub fn new(slots: [Option<Hand>; 3]) -> Self {
        Self { slots }
    }

    /// Build an order from companion text such as `"HMS"`.
    ///
    /// Only the first three characters count. Character `i` fills ring `i`;
    /// an unrecognised character leaves its ring empty. Never fails.
    pub fn parse(text: &str) -> Self {
        let mut slots = [None; 3];
        for (slot, c) in slots.iter_mut().zip(text.chars()) {
            *slot = Hand::from_char(c);
        }
        Self { slots }
    }

    /// The outermost ring showing `hand`, if any.
    pub fn ring_for(&self, hand: Hand) -> Option<Ring> {
        Ring::ALL
            .into_iter()
            .find(|ring| self.slots[ring.index()] == Some(hand))
    }

    /// Every ring showing `hand`. An order may place a hand more than once.
    pub fn rings_for(&self, hand: Hand) -> impl Iterator<Item = Ring> + '_ {
        Ring::ALL
            .into_iter()
            .filter(move |ring| self.slots[ring.index()] == Some(hand))
    }

    pub fn hand_on(&self, ring: Ring) -> Option<Hand> {
        self.slots[ring.index()]
    }

    /// Per-ring hand and angle, `None` for empty rings.
    pub fn layout(&self, angles: &ClockAngles) -> [Option<RingHand>; 3] {
        Ring::ALL.map(|ring| {
            self.hand_on(ring).map(|hand| RingHand {
                ring,
                hand,
                angle: angles.for_hand(hand),
            })
        })
    }
}

/// Persisted as three characters, `-` for an empty slot.
impl fmt::Display for HandOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.slots {
            write!(f, "{}", slot.map_or('-', |hand| hand.as_char()))?;
        }
        Ok(())
    }
}

impl Serialize for HandOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HandOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(HandOrder::parse(&text))
    }
}
