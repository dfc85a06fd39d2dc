//! Companion protocol: inbound update batches, outbound requests, and the
//! outboxes that carry requests away.
//!
//! The engine never waits on the companion. It hands a request to an
//! [`Outbox`] and carries on; whatever the companion answers comes back later
//! as an ordinary [`UpdateBatch`].

pub mod message;
pub mod outbox;
pub mod sun;

pub use message::{EntryValue, OutboundRequest, UpdateBatch, UpdateEntry, UpdateKey};
pub use outbox::JsonLineOutbox;
pub use sun::SunCompanion;

use anyhow::Result;

/// Fire-and-forget sink for [`OutboundRequest`]s.
///
/// A failed send is reported to the caller, which logs it and moves on. There
/// is no retry at this level.
#[cfg_attr(test, mockall::automock)]
pub trait Outbox {
    fn send(&mut self, request: &OutboundRequest) -> Result<()>;
}
