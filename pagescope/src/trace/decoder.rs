//! # Trace Decoder
//!
//! Turns the raw byte stream into [`TraceEvent`]s one record at a time.
//!
//! The decoder only checks record layout: an unknown tag or a record cut short
//! by the end of the buffer is reported as a [`DecodeError`]. Range checks and
//! allocation bookkeeping belong to the tracker.

use pagescope_common::{entry_address, entry_type_bits, EntryType, TraceEvent, HEADER_LEN};

use crate::domain::DecodeError;

/// Decode the record starting at `pos`
///
/// Returns `Ok(None)` once `pos` reaches the end of `buf`, otherwise the event
/// together with the number of bytes it occupied.
///
/// # Errors
/// Returns [`DecodeError::UnknownEntryType`] for tags outside the format and
/// [`DecodeError::Truncated`] when fewer bytes remain than the record needs.
pub fn decode_event(buf: &[u8], pos: usize) -> Result<Option<(TraceEvent, usize)>, DecodeError> {
    if pos >= buf.len() {
        return Ok(None);
    }

    let rest = &buf[pos..];
    let word = read_u64(rest, 0)
        .ok_or_else(|| DecodeError::truncated(pos, None, HEADER_LEN, rest.len()))?;

    let tag = entry_type_bits(word);
    let address = entry_address(word);
    let entry = EntryType::from_tag(tag).ok_or(DecodeError::UnknownEntryType { offset: pos, tag })?;

    let needed = entry.record_len();
    if rest.len() < needed {
        return Err(DecodeError::truncated(pos, Some(entry), needed, rest.len()));
    }

    // Length was checked above, so the field reads below cannot fail
    let field = |at: usize| read_u64(rest, at).unwrap_or_default();

    let event = match entry {
        EntryType::Reference => {
            let size = read_u32(rest, HEADER_LEN).unwrap_or_default();
            TraceEvent::Reference { address, size }
        }
        EntryType::Allocate => TraceEvent::Allocate { address, size: field(HEADER_LEN) },
        EntryType::AllocateZeroed => TraceEvent::AllocateZeroed {
            address,
            count: field(HEADER_LEN),
            elem_size: field(HEADER_LEN + 8),
        },
        EntryType::Reallocate => TraceEvent::Reallocate {
            new_address: address,
            old_address: field(HEADER_LEN),
            size: field(HEADER_LEN + 8),
        },
        EntryType::Free => TraceEvent::Free { address },
        EntryType::InstructionCount => TraceEvent::InstructionCount { count: address },
    };

    Ok(Some((event, needed)))
}

fn read_u64(buf: &[u8], at: usize) -> Option<u64> {
    let bytes = buf.get(at..at + 8)?;
    Some(u64::from_le_bytes(bytes.try_into().ok()?))
}

fn read_u32(buf: &[u8], at: usize) -> Option<u32> {
    let bytes = buf.get(at..at + 4)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

/// Lazy iterator over the events of an in-memory trace
///
/// Yields at most one error; after that the iterator is exhausted, since a
/// malformed record leaves no reliable position to resume from.
#[derive(Debug, Clone)]
pub struct TraceDecoder<'a> {
    buf: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> TraceDecoder<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0, failed: false }
    }
}

impl Iterator for TraceDecoder<'_> {
    type Item = Result<TraceEvent, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match decode_event(self.buf, self.pos) {
            Ok(Some((event, consumed))) => {
                self.pos += consumed;
                Some(Ok(event))
            }
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for TraceDecoder<'_> {}
