//! End-of-pass summary printed by the CLI

use std::io::{self, Write};

use crate::analysis::{footprints, global_footprint, largest_regions};
use crate::extract::Extraction;

/// Print the end-of-pass summary to stdout
pub fn display_summary(extraction: &Extraction, top: usize) {
    let stdout = io::stdout();
    let _ = write_summary(stdout.lock(), extraction, top);
}

/// Write the end-of-pass summary
///
/// `top` limits the region table to the regions with the most distinct pages;
/// 0 lists every region in slot order.
///
/// # Errors
/// Propagates write errors
pub fn write_summary<W: Write>(mut out: W, extraction: &Extraction, top: usize) -> io::Result<()> {
    let stats = &extraction.stats;
    let global = global_footprint(extraction);

    writeln!(
        out,
        "events: refs={} malloc/calloc={} realloc={} free={} icount={}",
        stats.references,
        stats.allocations,
        stats.reallocations,
        stats.frees,
        stats.instruction_markers
    )?;
    writeln!(
        out,
        "regions: tracked={} ignored={} freed={} unmatched_frees={}",
        stats.regions_created,
        stats.allocations_ignored,
        stats.regions_freed,
        stats.unmatched_releases
    )?;
    if let Some(icount) = stats.last_instruction_count {
        writeln!(out, "instructions: {icount}")?;
    }
    writeln!(
        out,
        "global: {} entries, {} distinct pages",
        global.references, global.distinct_pages
    )?;
    writeln!(out, "untracked: {} entries", extraction.untracked().len())?;

    let rows = if top == 0 {
        footprints(extraction).into_iter().skip(1).collect()
    } else {
        largest_regions(extraction, top)
    };
    if rows.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(
        out,
        "{:>6}  {:<33}  {:>8}  {:>8}  {:>7}  state",
        "slot", "pages", "entries", "distinct", "cover"
    )?;
    for fp in rows {
        let range = fp.pages.map(|r| r.to_string()).unwrap_or_default();
        let coverage = fp.coverage.unwrap_or_default();
        let state = if fp.obsolete { "freed" } else { "live" };
        writeln!(
            out,
            "{:>6}  {:<33}  {:>8}  {:>8}  {:>6.1}%  {state}",
            fp.slot.0, range, fp.references, fp.distinct_pages, coverage
        )?;
    }
    Ok(())
}
