//! Footprint analysis for extracted page sequences.
//!
//! Summarises each trace buffer into the numbers the downstream plots are
//! usually annotated with: how long the sequence is and how many distinct
//! pages it touched over the whole run.
//!
//! # Performance
//!
//! - `footprints()`: O(total sequence length) with one `HashSet` per slot
//! - Memory: O(distinct pages of the largest slot)

// Ratios intentionally convert counts to f64
#![allow(clippy::cast_precision_loss)]

use serde::Serialize;
use std::collections::HashSet;

use crate::domain::{AddressRange, TraceSlot, Vpn};
use crate::extract::Extraction;

// =============================================================================
// OUTPUT TYPES
// =============================================================================

/// Summary of one trace buffer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionFootprint {
    pub slot: TraceSlot,

    /// Page-aligned range of the region; `None` for the untracked bucket
    pub pages: Option<AddressRange>,

    /// Requested byte range; `None` for the untracked bucket
    pub requested: Option<AddressRange>,

    /// Whether the region was freed before the trace ended
    pub obsolete: bool,

    /// Entries in the deduplicated sequence
    pub references: usize,

    /// Distinct pages in the sequence (working-set size over the run)
    pub distinct_pages: usize,

    /// Share of the region's pages that were ever touched (0.0 - 100.0)
    pub coverage: Option<f64>,
}

/// Summary of the global sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalFootprint {
    pub references: usize,
    pub distinct_pages: usize,
    /// Entries summed over every tracked-region sequence
    pub tracked_references: usize,
}

// =============================================================================
// ANALYSIS
// =============================================================================

fn distinct(pages: &[Vpn]) -> usize {
    pages.iter().collect::<HashSet<_>>().len()
}

/// Per-slot footprints, slot 0 first
#[must_use]
pub fn footprints(extraction: &Extraction) -> Vec<RegionFootprint> {
    extraction
        .regions
        .iter()
        .enumerate()
        .map(|(i, pages)| {
            let slot = TraceSlot(i);
            let region = extraction.region(slot);
            let distinct_pages = distinct(pages);
            let coverage = region.map(|r| {
                let total = r.page_count(extraction.page_shift).max(1);
                distinct_pages as f64 / total as f64 * 100.0
            });

            RegionFootprint {
                slot,
                pages: region.map(|r| r.pages()),
                requested: region.map(|r| r.requested()),
                obsolete: region.is_some_and(|r| r.is_obsolete()),
                references: pages.len(),
                distinct_pages,
                coverage,
            }
        })
        .collect()
}

#[must_use]
pub fn global_footprint(extraction: &Extraction) -> GlobalFootprint {
    let tracked_references = extraction.regions.iter().skip(1).map(Vec::len).sum();
    GlobalFootprint {
        references: extraction.global.len(),
        distinct_pages: distinct(&extraction.global),
        tracked_references,
    }
}

/// Slots ranked by distinct pages touched, largest first
///
/// The untracked bucket is excluded. Ties keep slot order.
#[must_use]
pub fn largest_regions(extraction: &Extraction, limit: usize) -> Vec<RegionFootprint> {
    let mut ranked: Vec<_> = footprints(extraction).into_iter().skip(1).collect();
    ranked.sort_by(|a, b| b.distinct_pages.cmp(&a.distinct_pages));
    ranked.truncate(limit);
    ranked
}
