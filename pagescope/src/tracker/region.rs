//! Memory regions and their trace buffers

use serde::Serialize;

use crate::domain::{AddressRange, TraceSlot, Vpn};

/// A tracked allocation
///
/// Only the `obsolete` flag changes after creation. Regions stay in the arena
/// after being freed so their [`TraceSlot`] keeps pointing at them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    slot: TraceSlot,
    requested: AddressRange,
    pages: AddressRange,
    obsolete: bool,
}

impl MemoryRegion {
    pub(crate) fn new(slot: TraceSlot, requested: AddressRange, pages: AddressRange) -> Self {
        Self { slot, requested, pages, obsolete: false }
    }

    #[must_use]
    pub fn slot(&self) -> TraceSlot {
        self.slot
    }

    /// Byte range the program asked for
    #[must_use]
    pub fn requested(&self) -> AddressRange {
        self.requested
    }

    /// Page-aligned superset of [`requested`](Self::requested)
    #[must_use]
    pub fn pages(&self) -> AddressRange {
        self.pages
    }

    #[must_use]
    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.obsolete
    }

    /// Number of pages covered for the given page shift
    #[must_use]
    pub fn page_count(&self, page_shift: u32) -> u64 {
        self.pages.len() >> page_shift
    }

    pub(crate) fn mark_obsolete(&mut self) {
        self.obsolete = true;
    }
}

/// Append-only page sequence with no two equal neighbours
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TraceBuffer {
    pages: Vec<Vpn>,
}

impl TraceBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `vpn` unless it repeats the last entry
    ///
    /// Returns true if the page was appended.
    pub fn push(&mut self, vpn: Vpn) -> bool {
        if self.pages.last() == Some(&vpn) {
            return false;
        }
        self.pages.push(vpn);
        true
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Vpn] {
        &self.pages
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Vpn> {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_drops_consecutive_duplicates() {
        let mut buffer = TraceBuffer::new();
        assert!(buffer.push(1));
        assert!(!buffer.push(1));
        assert!(buffer.push(2));
        assert!(buffer.push(1));
        assert_eq!(buffer.as_slice(), &[1, 2, 1]);
    }

    #[test]
    fn test_region_obsolete_transition() {
        let mut region = MemoryRegion::new(
            TraceSlot(1),
            AddressRange::new(0x1010, 0x10010),
            AddressRange::new(0x1000, 0x11000),
        );
        assert!(region.is_live());
        assert_eq!(region.page_count(12), 16);

        region.mark_obsolete();
        assert!(region.is_obsolete());
        assert_eq!(region.slot(), TraceSlot(1));
        assert_eq!(region.pages(), AddressRange::new(0x1000, 0x11000));
    }
}
