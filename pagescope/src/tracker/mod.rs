//! # Object Lifetime Tracker
//!
//! Maintains the table of tracked allocations and routes every reference to
//! the trace buffer of the region that owns it.
//!
//! ## State
//!
//! ```text
//! regions  [ r1 | r2 (obsolete) | r3 | ... ]   arena, never shrinks
//! buffers  [ untracked | r1 | r2 | r3 | ... ]  indexed by TraceSlot
//! global   [ vpn, vpn, ... ]                   whole-run sequence
//! live     BTreeMap<page start, region>        non-obsolete regions only
//! ```
//!
//! ## Region lifecycle
//!
//! `Live -> Obsolete`, triggered by a `free` (or the free half of a `realloc`)
//! of the region's requested start address. There is no way back.
//!
//! ## Fatal conditions
//!
//! A new allocation whose page-aligned range intersects a live region aborts
//! the pass with [`ExtractError::OverlappingRegion`]; the overlap check runs
//! before the size threshold, so even untracked allocations are checked.

pub mod config;
mod index;
pub mod region;

pub use config::{ReferenceSpan, TrackerConfig};
pub use region::{MemoryRegion, TraceBuffer};

use log::{debug, trace};
use pagescope_common::{addr_to_vpn, page_align_down, page_align_up, TraceEvent};
use serde::Serialize;

use crate::domain::{AddressRange, ExtractError, TraceSlot, Vpn};
use crate::extract::Extraction;
use index::LiveIndex;

/// Counters collected during a pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStats {
    pub references: u64,
    /// `malloc` and `calloc` events
    pub allocations: u64,
    pub reallocations: u64,
    pub frees: u64,
    pub instruction_markers: u64,
    pub regions_created: u64,
    /// Allocations whose page-aligned span was under the threshold
    pub allocations_ignored: u64,
    pub regions_freed: u64,
    /// Frees (including the free half of a realloc) that matched no live region
    pub unmatched_releases: u64,
    /// Latest instruction count reported by the producer
    pub last_instruction_count: Option<u64>,
}

/// Single-pass tracker state
///
/// Owns everything a pass needs; independent trackers share nothing.
#[derive(Debug, Clone)]
pub struct ObjectTracker {
    config: TrackerConfig,
    regions: Vec<MemoryRegion>,
    live: LiveIndex,
    /// Slot 0 is the untracked bucket
    buffers: Vec<TraceBuffer>,
    global: TraceBuffer,
    stats: TrackerStats,
}

impl Default for ObjectTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectTracker {
    /// Create a tracker with the default page size and threshold
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: TrackerConfig::default(),
            regions: Vec::new(),
            live: LiveIndex::default(),
            buffers: vec![TraceBuffer::new()],
            global: TraceBuffer::new(),
            stats: TrackerStats::default(),
        }
    }

    /// Create a tracker with a custom configuration
    ///
    /// # Errors
    /// Returns [`ExtractError::InvalidConfig`] if the configuration is rejected
    pub fn with_config(config: TrackerConfig) -> Result<Self, ExtractError> {
        config.validate()?;
        Ok(Self { config, ..Self::new() })
    }

    /// All regions ever created, in creation order
    #[must_use]
    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    #[must_use]
    pub fn region(&self, slot: TraceSlot) -> Option<&MemoryRegion> {
        self.regions.get(slot.region_index()?)
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Per-slot buffers, slot 0 first
    #[must_use]
    pub fn buffers(&self) -> &[TraceBuffer] {
        &self.buffers
    }

    #[must_use]
    pub fn buffer(&self, slot: TraceSlot) -> Option<&TraceBuffer> {
        self.buffers.get(slot.0)
    }

    #[must_use]
    pub fn global(&self) -> &TraceBuffer {
        &self.global
    }

    #[must_use]
    pub fn stats(&self) -> &TrackerStats {
        &self.stats
    }

    // ------------------------------------------------------------------------
    // Event dispatch
    // ------------------------------------------------------------------------

    /// Apply one decoded event
    ///
    /// # Errors
    /// Returns [`ExtractError::OverlappingRegion`] if the event allocates over a
    /// live region
    pub fn process(&mut self, event: &TraceEvent) -> Result<(), ExtractError> {
        trace!("{event:x?}");

        match *event {
            TraceEvent::Reference { address, size } => {
                self.stats.references += 1;
                self.record_reference(address, size);
            }
            TraceEvent::Allocate { address, size } => {
                self.stats.allocations += 1;
                self.allocate(address, size)?;
            }
            TraceEvent::AllocateZeroed { address, count, elem_size } => {
                self.stats.allocations += 1;
                self.allocate_zeroed(address, count, elem_size)?;
            }
            TraceEvent::Reallocate { new_address, old_address, size } => {
                self.stats.reallocations += 1;
                self.reallocate(new_address, old_address, size)?;
            }
            TraceEvent::Free { address } => {
                self.stats.frees += 1;
                self.free(address);
            }
            TraceEvent::InstructionCount { count } => {
                self.stats.instruction_markers += 1;
                self.count_instructions(count);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // References
    // ------------------------------------------------------------------------

    /// Slot of the live region whose page range contains `address`
    #[must_use]
    pub fn resolve(&self, address: u64) -> TraceSlot {
        self.live
            .containing(address)
            .map_or(TraceSlot::UNTRACKED, TraceSlot::for_region_index)
    }

    /// Record a `size`-byte access at `address`
    ///
    /// With [`ReferenceSpan::StartPage`] the size is ignored and only the page
    /// holding `address` is recorded.
    pub fn record_reference(&mut self, address: u64, size: u32) {
        match self.config.reference_span {
            ReferenceSpan::StartPage => self.record_page(address),
            ReferenceSpan::EveryPage => {
                let shift = self.config.page_shift;
                let last_byte = address.saturating_add(u64::from(size.max(1)) - 1);
                let first = addr_to_vpn(address, shift);
                for vpn in first..=addr_to_vpn(last_byte, shift) {
                    let at = if vpn == first { address } else { vpn << shift };
                    self.record_page(at);
                }
            }
        }
    }

    fn record_page(&mut self, address: u64) {
        let slot = self.resolve(address);
        let vpn: Vpn = addr_to_vpn(address, self.config.page_shift);
        self.buffers[slot.0].push(vpn);
        self.global.push(vpn);
    }

    // ------------------------------------------------------------------------
    // Allocations
    // ------------------------------------------------------------------------

    /// Track the allocation `[address, address + size)`
    ///
    /// Returns the new region's slot, or `None` if the page-aligned span is
    /// below the threshold.
    ///
    /// # Errors
    /// Returns [`ExtractError::OverlappingRegion`] if the page-aligned span
    /// intersects a live region
    pub fn allocate(&mut self, address: u64, size: u64) -> Result<Option<TraceSlot>, ExtractError> {
        let shift = self.config.page_shift;
        let requested = AddressRange::new(address, address.saturating_add(size));
        let pages = AddressRange::new(
            page_align_down(requested.start, shift),
            page_align_up(requested.end, shift),
        );

        if let Some((index, existing_pages)) = self.live.overlapping(pages) {
            return Err(ExtractError::OverlappingRegion {
                requested,
                requested_pages: pages,
                existing_slot: TraceSlot::for_region_index(index),
                existing_pages,
            });
        }

        if pages.len() < self.config.threshold_bytes() {
            debug!("ignoring small allocation {requested} ({} bytes)", requested.len());
            self.stats.allocations_ignored += 1;
            return Ok(None);
        }

        let index = self.regions.len();
        let slot = TraceSlot::for_region_index(index);
        self.regions.push(MemoryRegion::new(slot, requested, pages));
        self.buffers.push(TraceBuffer::new());
        self.live.insert(index, requested, pages);
        self.stats.regions_created += 1;

        debug!("tracking {slot}: requested {requested}, pages {pages}");
        Ok(Some(slot))
    }

    /// Track a `calloc(count, elem_size)` result
    ///
    /// # Errors
    /// Same as [`allocate`](Self::allocate)
    pub fn allocate_zeroed(
        &mut self,
        address: u64,
        count: u64,
        elem_size: u64,
    ) -> Result<Option<TraceSlot>, ExtractError> {
        self.allocate(address, count.saturating_mul(elem_size))
    }

    /// Mark the live region allocated at `address` obsolete
    ///
    /// Addresses with no live region (never tracked, too small, or already
    /// freed) are ignored. Returns the freed slot.
    pub fn free(&mut self, address: u64) -> Option<TraceSlot> {
        let regions = &self.regions;
        let Some(index) = self.live.remove_by_request(address, |i| regions[i].pages()) else {
            self.stats.unmatched_releases += 1;
            return None;
        };

        let region = &mut self.regions[index];
        region.mark_obsolete();
        self.stats.regions_freed += 1;
        debug!("released {} (pages {})", region.slot(), region.pages());
        Some(region.slot())
    }

    /// `free(old_address)` followed by `allocate(new_address, size)`
    ///
    /// # Errors
    /// Same as [`allocate`](Self::allocate)
    pub fn reallocate(
        &mut self,
        new_address: u64,
        old_address: u64,
        size: u64,
    ) -> Result<Option<TraceSlot>, ExtractError> {
        self.free(old_address);
        self.allocate(new_address, size)
    }

    /// Remember the producer's running instruction count
    pub fn count_instructions(&mut self, count: u64) {
        self.stats.last_instruction_count = Some(count);
    }

    /// End the pass and hand the sequences to the caller
    #[must_use]
    pub fn finish(self) -> Extraction {
        Extraction {
            page_shift: self.config.page_shift,
            global: self.global.into_vec(),
            regions: self.buffers.into_iter().map(TraceBuffer::into_vec).collect(),
            region_table: self.regions,
            stats: self.stats,
        }
    }
}
