//! Record writer mirroring the instrumentation tool's output
//!
//! Used to build fixtures and synthetic traces without running an
//! instrumented program.

use pagescope_common::TraceEvent;
use std::io::{self, Write};

/// Streams encoded records into any writer
pub struct TraceWriter<W: Write> {
    inner: W,
    records: u64,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, records: 0 }
    }

    /// Append one record
    ///
    /// # Errors
    /// Propagates I/O errors from the underlying writer
    pub fn write_event(&mut self, event: &TraceEvent) -> io::Result<()> {
        self.inner.write_all(event.encode().as_bytes())?;
        self.records += 1;
        Ok(())
    }

    /// Append a batch of records in order
    ///
    /// # Errors
    /// Propagates I/O errors from the underlying writer
    pub fn write_all_events<'e>(
        &mut self,
        events: impl IntoIterator<Item = &'e TraceEvent>,
    ) -> io::Result<()> {
        for event in events {
            self.write_event(event)?;
        }
        Ok(())
    }

    /// Number of records written so far
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Flush and hand back the underlying writer
    ///
    /// # Errors
    /// Propagates the flush error
    pub fn into_inner(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Encode a whole trace into a byte vector
#[must_use]
pub fn encode_trace(events: &[TraceEvent]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(events.len() * pagescope_common::MAX_RECORD_LEN);
    for event in events {
        bytes.extend_from_slice(event.encode().as_bytes());
    }
    bytes
}
