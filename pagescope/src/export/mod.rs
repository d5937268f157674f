//! Sequence export functionality
//!
//! Hands extracted sequences to external tooling. Currently supports a single
//! JSON document holding the global sequence and every per-slot sequence.

pub mod sequences;

pub use sequences::SequenceExporter;
