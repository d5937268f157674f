//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep trace-buffer slots, arena indices and raw page
//! numbers from being mixed up in tracker signatures.

use serde::Serialize;
use std::fmt;

/// Virtual page number (`address >> page_shift`)
pub type Vpn = u64;

/// Index of a trace buffer
///
/// Slot 0 is the untracked bucket; slots `1..=N` belong to tracked regions in
/// creation order. A slot is assigned once and never reused, even after its
/// region has been freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TraceSlot(pub usize);

impl TraceSlot {
    /// References that fall outside every live region land here
    pub const UNTRACKED: TraceSlot = TraceSlot(0);

    /// Returns true for the untracked bucket
    #[must_use]
    pub fn is_untracked(self) -> bool {
        self == Self::UNTRACKED
    }

    /// Position of the owning region in the region arena
    ///
    /// `None` for the untracked bucket.
    #[must_use]
    pub fn region_index(self) -> Option<usize> {
        self.0.checked_sub(1)
    }

    /// Slot owned by the region at arena position `index`
    #[must_use]
    pub fn for_region_index(index: usize) -> Self {
        TraceSlot(index + 1)
    }
}

impl fmt::Display for TraceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_untracked() {
            write!(f, "slot#0(untracked)")
        } else {
            write!(f, "slot#{}", self.0)
        }
    }
}

/// Half-open byte range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AddressRange {
    pub start: u64,
    pub end: u64,
}

impl AddressRange {
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Check if an address falls within this range
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }

    /// Two ranges intersect when each starts before the other ends
    #[must_use]
    pub fn overlaps(&self, other: &AddressRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}-0x{:x}", self.start, self.end)
    }
}
