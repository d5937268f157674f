//! Binary trace format handling
//!
//! - [`decoder`]: lazy, fail-fast parsing of the flat record stream
//! - [`encoder`]: writes records in the producer's layout (fixtures, synthetic traces)

pub mod decoder;
pub mod encoder;

pub use decoder::{decode_event, TraceDecoder};
pub use encoder::{encode_trace, TraceWriter};
pub use pagescope_common::{EntryType, TraceEvent};
