//! # pagescope - Memory Locality Trace Extraction
//!
//! pagescope reconstructs per-object and global virtual-memory access patterns
//! from a raw binary execution trace, for offline analysis of memory locality.
//! The trace is produced by an instrumentation tool that logs every memory
//! reference together with the program's `malloc`/`calloc`/`realloc`/`free`
//! calls.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                Instrumented Program (producer)                  │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ flat binary trace (pagescope-common layout)
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     pagescope (This Crate)                      │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │    Trace     │──▶│    Object    │──▶│  Extraction  │         │
//! │  │   Decoder    │   │   Tracker    │   │  (sequences) │         │
//! │  └──────────────┘   └──────────────┘   └──────┬───────┘         │
//! │                                               │                 │
//! │                          ┌────────────────────┼──────────┐      │
//! │                          ▼                    ▼          ▼      │
//! │                   ┌──────────────┐   ┌──────────────┐  summary  │
//! │                   │   Analysis   │   │    Export    │           │
//! │                   │ (footprints) │   │    (JSON)    │           │
//! │                   └──────────────┘   └──────────────┘           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`trace`]: record decoding (and encoding, for fixtures and synthetic traces)
//! - [`tracker`]: memory regions, live interval index, per-slot trace buffers
//! - [`extract`]: single forward pass from bytes to [`extract::Extraction`]
//! - [`analysis`]: footprint summaries over extracted sequences
//! - [`export`]: JSON hand-off of all sequences
//! - [`cli`]: argument parsing and the printed summary
//! - [`domain`]: newtypes ([`domain::TraceSlot`], [`domain::AddressRange`]) and errors
//!
//! ## Outputs
//!
//! - **Global sequence**: every referenced page number in trace order, with
//!   consecutive repeats collapsed
//! - **Region sequences**: one per trace slot; slot 0 collects references
//!   outside every live region, slots `1..=N` belong to tracked allocations
//!   in creation order
//!
//! ## Typical Usage
//!
//! ```no_run
//! use pagescope::extract::extract_file;
//! use pagescope::tracker::TrackerConfig;
//!
//! # fn example() -> Result<(), pagescope::domain::ExtractError> {
//! let extraction = extract_file("app.trace", &TrackerConfig::default())?;
//! println!("{} regions, {} global pages", extraction.region_count(), extraction.global.len());
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod domain;
pub mod export;
pub mod extract;
pub mod trace;
pub mod tracker;
