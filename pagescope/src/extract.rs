//! Extraction driver
//!
//! Runs the decoder and the tracker in lockstep over a whole trace. Either the
//! full set of sequences comes back, or a fatal [`ExtractError`] and nothing
//! else.

use log::{debug, info};
use serde::Serialize;
use std::path::Path;

use crate::domain::{ExtractError, TraceSlot, Vpn};
use crate::trace::{TraceDecoder, TraceEvent};
use crate::tracker::{MemoryRegion, ObjectTracker, TrackerConfig, TrackerStats};

/// Result of one extraction pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub page_shift: u32,

    /// Page sequence over the whole run
    pub global: Vec<Vpn>,

    /// Page sequences indexed by [`TraceSlot`]; entry 0 is the untracked bucket
    pub regions: Vec<Vec<Vpn>>,

    /// Every region created during the pass, in slot order
    pub region_table: Vec<MemoryRegion>,

    pub stats: TrackerStats,
}

impl Extraction {
    /// References that fell outside every live region
    #[must_use]
    pub fn untracked(&self) -> &[Vpn] {
        &self.regions[TraceSlot::UNTRACKED.0]
    }

    #[must_use]
    pub fn sequence(&self, slot: TraceSlot) -> Option<&[Vpn]> {
        self.regions.get(slot.0).map(Vec::as_slice)
    }

    #[must_use]
    pub fn region(&self, slot: TraceSlot) -> Option<&MemoryRegion> {
        self.region_table.get(slot.region_index()?)
    }

    /// Number of tracked regions (excludes the untracked bucket)
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.region_table.len()
    }
}

/// Extract page sequences from an in-memory trace
///
/// # Errors
/// Returns [`ExtractError::MalformedTrace`] on a bad record,
/// [`ExtractError::OverlappingRegion`] on an overlapping allocation, and
/// [`ExtractError::InvalidConfig`] if `config` is rejected.
pub fn extract(bytes: &[u8], config: &TrackerConfig) -> Result<Extraction, ExtractError> {
    let mut tracker = ObjectTracker::with_config(config.clone())?;

    for event in TraceDecoder::new(bytes) {
        tracker.process(&event?)?;
    }
    debug!("{} regions still live at end of trace", tracker.live_count());

    let extraction = tracker.finish();
    log_summary(bytes.len(), &extraction);
    Ok(extraction)
}

/// Extract page sequences from already-decoded events
///
/// # Errors
/// Same as [`extract`], minus decoding failures
pub fn extract_events<'e>(
    events: impl IntoIterator<Item = &'e TraceEvent>,
    config: &TrackerConfig,
) -> Result<Extraction, ExtractError> {
    let mut tracker = ObjectTracker::with_config(config.clone())?;
    for event in events {
        tracker.process(event)?;
    }
    Ok(tracker.finish())
}

/// Read a trace file and extract it
///
/// # Errors
/// Returns [`ExtractError::Io`] if the file cannot be read, otherwise the same
/// as [`extract`]
pub fn extract_file(
    path: impl AsRef<Path>,
    config: &TrackerConfig,
) -> Result<Extraction, ExtractError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    info!("Read {} ({} bytes)", path.display(), bytes.len());
    extract(&bytes, config)
}

fn log_summary(trace_len: usize, extraction: &Extraction) {
    let stats = &extraction.stats;
    info!(
        "Extracted {} bytes: {} references, {} regions tracked ({} ignored, {} freed), \
         {} global pages",
        trace_len,
        stats.references,
        stats.regions_created,
        stats.allocations_ignored,
        stats.regions_freed,
        extraction.global.len()
    );
}
