//! Analysis logic for extracted sequences
//!
//! Pure summaries over an [`Extraction`](crate::extract::Extraction), kept
//! apart from the CLI presentation layer.

pub mod footprint;

pub use footprint::{
    footprints, global_footprint, largest_regions, GlobalFootprint, RegionFootprint,
};
