//! # Shared Trace Format (Producer ↔ Extractor)
//!
//! Defines the on-disk record layout written by the instrumentation tool and
//! read back by the extraction engine. Kept `no_std` and dependency-free so the
//! same definitions can back producers, fixtures and the decoder alike.
//!
//! ## Record Layout
//!
//! Every record starts with one 8-byte little-endian word:
//!
//! ```text
//!  63    60 59                                                0
//! ┌────────┬───────────────────────────────────────────────────┐
//! │  tag   │              address / pointer / icount           │
//! └────────┴───────────────────────────────────────────────────┘
//! ```
//!
//! The tag selects the trailing little-endian fields:
//!
//! | Tag | Entry            | Trailing fields                 |
//! |-----|------------------|---------------------------------|
//! | 0x0 | reference        | 4-byte size                     |
//! | 0x8 | malloc           | 8-byte size                     |
//! | 0x9 | calloc           | 8-byte count, 8-byte elem size  |
//! | 0xa | realloc          | 8-byte old pointer, 8-byte size |
//! | 0xb | free             | -                               |
//! | 0xf | instruction count| -                               |
//!
//! ## Key Types
//!
//! - [`EntryType`] - Tag decoding and per-kind payload length
//! - [`TraceEvent`] - One decoded record
//! - [`EncodedRecord`] - Exact byte image of a record

#![no_std]

// ============================================================================
// Entry Tags
// ============================================================================

/// Bit position of the 4-bit entry tag inside the header word
pub const TYPE_SHIFT: u32 = 60;

/// Mask selecting the 60 address bits of a header word
pub const ADDR_MASK: u64 = (1 << TYPE_SHIFT) - 1;

/// Memory reference (load or store)
pub const TYPE_REF: u8 = 0x0;

/// `malloc()` return
pub const TYPE_MALLOC: u8 = 0x8;

/// `calloc()` return
pub const TYPE_CALLOC: u8 = 0x9;

/// `realloc()` return
pub const TYPE_REALLOC: u8 = 0xa;

/// `free()` call
pub const TYPE_FREE: u8 = 0xb;

/// Instruction count marker
///
/// The producer stores its running instruction count in the address bits.
pub const TYPE_ICOUNT: u8 = 0xf;

// ============================================================================
// Page Geometry
// ============================================================================

/// Default page shift (4 KiB pages)
pub const PAGE_SHIFT: u32 = 12;

/// Default page size in bytes
pub const PAGE_SIZE: u64 = 1 << PAGE_SHIFT;

/// Minimum page-aligned span, in pages, for an allocation to be tracked
pub const MEM_AREA_THRESHOLD_PAGES: u64 = 10;

/// Size of the tagged header word
pub const HEADER_LEN: usize = 8;

/// Longest possible record (header plus two 8-byte fields)
pub const MAX_RECORD_LEN: usize = HEADER_LEN + 16;

/// Extract the 4-bit tag from a header word
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn entry_type_bits(word: u64) -> u8 {
    (word >> TYPE_SHIFT) as u8
}

/// Extract the 60-bit address payload from a header word
#[must_use]
pub const fn entry_address(word: u64) -> u64 {
    word & ADDR_MASK
}

/// Build a header word; address bits above 59 are dropped
#[must_use]
pub const fn pack_word(tag: u8, address: u64) -> u64 {
    ((tag as u64 & 0xf) << TYPE_SHIFT) | (address & ADDR_MASK)
}

/// Virtual page number of `address` for the given page shift
#[must_use]
pub const fn addr_to_vpn(address: u64, page_shift: u32) -> u64 {
    address >> page_shift
}

/// Round `address` down to a page boundary
#[must_use]
pub const fn page_align_down(address: u64, page_shift: u32) -> u64 {
    address & !((1u64 << page_shift) - 1)
}

/// Round `address` up to a page boundary, saturating at the last full page
#[must_use]
pub const fn page_align_up(address: u64, page_shift: u32) -> u64 {
    let mask = (1u64 << page_shift) - 1;
    match address.checked_add(mask) {
        Some(v) => v & !mask,
        None => u64::MAX & !mask,
    }
}

// ============================================================================
// Entry Types
// ============================================================================

/// Kind of a trace record, selected by the header tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Reference,
    Allocate,
    AllocateZeroed,
    Reallocate,
    Free,
    InstructionCount,
}

impl EntryType {
    /// Map a raw tag to an entry type; `None` for tags the format does not define
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            TYPE_REF => Some(Self::Reference),
            TYPE_MALLOC => Some(Self::Allocate),
            TYPE_CALLOC => Some(Self::AllocateZeroed),
            TYPE_REALLOC => Some(Self::Reallocate),
            TYPE_FREE => Some(Self::Free),
            TYPE_ICOUNT => Some(Self::InstructionCount),
            _ => None,
        }
    }

    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Reference => TYPE_REF,
            Self::Allocate => TYPE_MALLOC,
            Self::AllocateZeroed => TYPE_CALLOC,
            Self::Reallocate => TYPE_REALLOC,
            Self::Free => TYPE_FREE,
            Self::InstructionCount => TYPE_ICOUNT,
        }
    }

    /// Bytes following the header word for this kind
    #[must_use]
    pub const fn payload_len(self) -> usize {
        match self {
            Self::Reference => 4,
            Self::Allocate => 8,
            Self::AllocateZeroed | Self::Reallocate => 16,
            Self::Free | Self::InstructionCount => 0,
        }
    }

    /// Total on-disk length of a record of this kind
    #[must_use]
    pub const fn record_len(self) -> usize {
        HEADER_LEN + self.payload_len()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Allocate => "malloc",
            Self::AllocateZeroed => "calloc",
            Self::Reallocate => "realloc",
            Self::Free => "free",
            Self::InstructionCount => "icount",
        }
    }
}

impl core::fmt::Display for EntryType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Trace Events
// ============================================================================

/// One decoded trace record
///
/// Addresses are the 60-bit payloads from the header word; trailing fields are
/// carried at their on-disk width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// `size` bytes accessed at `address`
    Reference { address: u64, size: u32 },

    /// `malloc(size)` returned `address`
    Allocate { address: u64, size: u64 },

    /// `calloc(count, elem_size)` returned `address`
    AllocateZeroed { address: u64, count: u64, elem_size: u64 },

    /// `realloc(old_address, size)` returned `new_address`
    Reallocate { new_address: u64, old_address: u64, size: u64 },

    /// `free(address)`, where `address` is the originally returned pointer
    Free { address: u64 },

    /// Running instruction count at this point of the trace
    InstructionCount { count: u64 },
}

impl TraceEvent {
    #[must_use]
    pub const fn entry_type(&self) -> EntryType {
        match self {
            Self::Reference { .. } => EntryType::Reference,
            Self::Allocate { .. } => EntryType::Allocate,
            Self::AllocateZeroed { .. } => EntryType::AllocateZeroed,
            Self::Reallocate { .. } => EntryType::Reallocate,
            Self::Free { .. } => EntryType::Free,
            Self::InstructionCount { .. } => EntryType::InstructionCount,
        }
    }

    /// Encode this event exactly as the producer writes it
    #[must_use]
    pub fn encode(&self) -> EncodedRecord {
        let mut record = EncodedRecord::new();
        let tag = self.entry_type().tag();
        match *self {
            Self::Reference { address, size } => {
                record.push(&pack_word(tag, address).to_le_bytes());
                record.push(&size.to_le_bytes());
            }
            Self::Allocate { address, size } => {
                record.push(&pack_word(tag, address).to_le_bytes());
                record.push(&size.to_le_bytes());
            }
            Self::AllocateZeroed { address, count, elem_size } => {
                record.push(&pack_word(tag, address).to_le_bytes());
                record.push(&count.to_le_bytes());
                record.push(&elem_size.to_le_bytes());
            }
            Self::Reallocate { new_address, old_address, size } => {
                record.push(&pack_word(tag, new_address).to_le_bytes());
                record.push(&old_address.to_le_bytes());
                record.push(&size.to_le_bytes());
            }
            Self::Free { address } => {
                record.push(&pack_word(tag, address).to_le_bytes());
            }
            Self::InstructionCount { count } => {
                record.push(&pack_word(tag, count).to_le_bytes());
            }
        }
        record
    }
}

/// Fixed-capacity byte image of a single record
#[derive(Clone, Copy)]
pub struct EncodedRecord {
    bytes: [u8; MAX_RECORD_LEN],
    len: usize,
}

impl EncodedRecord {
    const fn new() -> Self {
        Self { bytes: [0; MAX_RECORD_LEN], len: 0 }
    }

    fn push(&mut self, data: &[u8]) {
        self.bytes[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl core::fmt::Debug for EncodedRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.as_bytes()).finish()
    }
}
