//! Outbox that writes each request as one JSON line.

use anyhow::{Context, Result};
use std::io::{self, Stdout, Write};

use super::{OutboundRequest, Outbox};

/// Writes `{"requestRefresh":1}` style lines to any writer.
///
/// The host uses it on standard output when no built-in sun companion is
/// configured, leaving the answer to whatever process reads that stream.
pub struct JsonLineOutbox<W: Write> {
    writer: W,
}

impl<W: Write> JsonLineOutbox<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLineOutbox<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Outbox for JsonLineOutbox<W> {
    fn send(&mut self, request: &OutboundRequest) -> Result<()> {
        let line = serde_json::to_string(request).context("Failed to encode request")?;
        writeln!(self.writer, "{line}").context("Failed to write request")?;
        self.writer.flush().context("Failed to flush request")?;
        Ok(())
    }
}
