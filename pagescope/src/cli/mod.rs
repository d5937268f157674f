//! Command-line interface

pub mod args;
pub mod summary;

pub use args::Args;
pub use summary::display_summary;
