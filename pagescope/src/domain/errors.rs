//! Structured error types for pagescope
//!
//! Using thiserror for automatic Display implementation and error chaining.

use super::types::{AddressRange, TraceSlot};
use pagescope_common::EntryType;
use thiserror::Error;

/// Byte-level failures while decoding a trace
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown entry type {tag:#x} at byte offset {offset}")]
    UnknownEntryType { offset: usize, tag: u8 },

    #[error(
        "truncated {entry} record at byte offset {offset}: needs {needed} bytes, {remaining} remain"
    )]
    Truncated { offset: usize, entry: &'static str, needed: usize, remaining: usize },
}

impl DecodeError {
    pub(crate) fn truncated(
        offset: usize,
        entry: Option<EntryType>,
        needed: usize,
        remaining: usize,
    ) -> Self {
        Self::Truncated {
            offset,
            entry: entry.map_or("header", EntryType::name),
            needed,
            remaining,
        }
    }
}

/// Fatal conditions that abort an extraction pass
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("malformed trace: {0}")]
    MalformedTrace(#[from] DecodeError),

    #[error(
        "overlapping memory object: requested {requested} (pages {requested_pages}) \
         intersects live {existing_slot} (pages {existing_pages})"
    )]
    OverlappingRegion {
        requested: AddressRange,
        requested_pages: AddressRange,
        existing_slot: TraceSlot,
        existing_pages: AddressRange,
    },

    #[error("invalid tracker configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
