//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::tracker::{ReferenceSpan, TrackerConfig};

#[derive(Parser)]
#[command(
    name = "pagescope",
    about = "Extract per-object and global page reference sequences from a memory trace",
    after_help = "\
EXAMPLES:
    pagescope app.trace                          Print a per-region summary
    pagescope app.trace --export app.json        Also write all sequences as JSON
    pagescope app.trace --every-page             Record every page a reference spans"
)]
pub struct Args {
    /// Binary trace file produced by the instrumentation tool
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Write the extracted sequences to FILE as JSON
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Indent the exported JSON
    #[arg(long, requires = "export")]
    pub pretty: bool,

    /// log2 of the page size
    #[arg(long, default_value_t = pagescope_common::PAGE_SHIFT)]
    pub page_shift: u32,

    /// Minimum page-aligned span, in pages, for an allocation to be tracked
    #[arg(long, default_value_t = pagescope_common::MEM_AREA_THRESHOLD_PAGES)]
    pub threshold_pages: u64,

    /// Record every page a reference spans instead of only its first page
    #[arg(long)]
    pub every_page: bool,

    /// Number of regions listed in the summary (0 = all)
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Tracker configuration selected on the command line
    #[must_use]
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            page_shift: self.page_shift,
            threshold_pages: self.threshold_pages,
            reference_span: if self.every_page {
                ReferenceSpan::EveryPage
            } else {
                ReferenceSpan::StartPage
            },
        }
    }
}
