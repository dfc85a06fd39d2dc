//! Wire types exchanged with the companion.
//!
//! Inbound, the companion sends one JSON object per batch:
//!
//! ```json
//! {"invertPolicy": "sunrise", "handOrder": "HMS", "textClockVisible": true}
//! ```
//!
//! Keys may be the current camelCase names, the names of the first companion
//! revision (`KEY_INVERT`, `KEY_TEXT_TIME`, ...) or the numeric message tags.
//! Order inside a batch is kept, and so are duplicate keys: a later entry for
//! the same key overwrites an earlier one when the batch is applied.
//!
//! Outbound, the only request is `{"requestRefresh":1}`.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// What an inbound entry addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKey {
    InvertPolicy,
    TextClockVisible,
    HandOrder,
    WindowStartHour,
    WindowStartMinute,
    WindowEndHour,
    WindowEndMinute,
    /// Marks a batch as the answer to a refresh request.
    RefreshAck,
    /// Start bound as `"HH:MM"` text, as the first companion sent it.
    WindowStart,
    /// End bound as `"HH:MM"` text.
    WindowEnd,
}

impl UpdateKey {
    /// Resolve a key name. Unknown names yield `None` and are skipped.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "invertPolicy" | "KEY_INVERT" | "0" => Self::InvertPolicy,
            "textClockVisible" | "KEY_TEXT_TIME" | "1" => Self::TextClockVisible,
            "handOrder" | "KEY_HAND_ORDER" | "2" => Self::HandOrder,
            "windowStartHour" | "3" => Self::WindowStartHour,
            "windowStartMinute" | "4" => Self::WindowStartMinute,
            "windowEndHour" | "5" => Self::WindowEndHour,
            "windowEndMinute" | "6" => Self::WindowEndMinute,
            "refreshAck" | "7" => Self::RefreshAck,
            "invertStart" | "KEY_INVERT_START" | "8" => Self::WindowStart,
            "invertEnd" | "KEY_INVERT_END" | "9" => Self::WindowEnd,
            _ => return None,
        };
        Some(key)
    }

    /// Canonical camelCase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvertPolicy => "invertPolicy",
            Self::TextClockVisible => "textClockVisible",
            Self::HandOrder => "handOrder",
            Self::WindowStartHour => "windowStartHour",
            Self::WindowStartMinute => "windowStartMinute",
            Self::WindowEndHour => "windowEndHour",
            Self::WindowEndMinute => "windowEndMinute",
            Self::RefreshAck => "refreshAck",
            Self::WindowStart => "invertStart",
            Self::WindowEnd => "invertEnd",
        }
    }
}

/// A decoded entry value. Anything JSON can carry is accepted here; whether
/// it means something is decided per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryValue {
    Bool(bool),
    Int(i64),
    Text(String),
    /// `null`, used by marker keys such as `refreshAck`.
    Empty,
    Other(serde_json::Value),
}

impl EntryValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// On/off switch: a bool, `1`/`0`, or `"on"`/`"off"`/`"true"`/`"false"`.
    pub fn as_switch(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            Self::Int(1) => Some(true),
            Self::Int(0) => Some(false),
            Self::Text(text) => match text.as_str() {
                "on" | "true" | "1" => Some(true),
                "off" | "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// A byte, from an integer or from its decimal text.
    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Self::Int(value) => u8::try_from(*value).ok(),
            Self::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// `"HH:MM"` text as an `(hour, minute)` pair, without range checks.
    pub fn as_clock_time(&self) -> Option<(u8, u8)> {
        let (hour, minute) = self.as_text()?.split_once(':')?;
        Some((hour.trim().parse().ok()?, minute.trim().parse().ok()?))
    }
}

impl From<bool> for EntryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for EntryValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u8> for EntryValue {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for EntryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EntryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<()> for EntryValue {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEntry {
    /// Raw key name as received.
    pub key: String,
    pub value: EntryValue,
}

impl UpdateEntry {
    pub fn key(&self) -> Option<UpdateKey> {
        UpdateKey::from_name(&self.key)
    }
}

/// One inbound message, entries in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateBatch {
    entries: Vec<UpdateEntry>,
}

impl UpdateBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<EntryValue>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<EntryValue>) {
        self.entries.push(UpdateEntry {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn entries(&self) -> &[UpdateEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Decode one JSON line.
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

impl<'de> Deserialize<'de> for UpdateBatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BatchVisitor;

        impl<'de> Visitor<'de> for BatchVisitor {
            type Value = UpdateBatch;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of update entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut batch = UpdateBatch::new();
                while let Some((key, value)) = map.next_entry::<String, EntryValue>()? {
                    batch.push(key, value);
                }
                Ok(batch)
            }
        }

        deserializer.deserialize_map(BatchVisitor)
    }
}

impl Serialize for UpdateBatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.value)?;
        }
        map.end()
    }
}

/// Requests sent to the companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundRequest {
    /// Ask for fresh sunrise/sunset window bounds.
    RequestRefresh,
}

impl Serialize for OutboundRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::RequestRefresh => map.serialize_entry("requestRefresh", &1)?,
        }
        map.end()
    }
}

impl fmt::Display for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestRefresh => write!(f, "requestRefresh"),
        }
    }
}
