//! # pagescope - Main Entry Point
//!
//! Reads one trace file, runs the extraction pass, prints a summary and
//! optionally exports every sequence as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use pagescope::cli::{display_summary, Args};
use pagescope::domain::ExtractError;
use pagescope::export::SequenceExporter;
use pagescope::extract::extract_file;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_MALFORMED_TRACE: i32 = 3;
const EXIT_OVERLAPPING_REGION: i32 = 4;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ExtractError>() {
        Some(ExtractError::MalformedTrace(_)) => EXIT_MALFORMED_TRACE,
        Some(ExtractError::OverlappingRegion { .. }) => EXIT_OVERLAPPING_REGION,
        _ => EXIT_ERROR,
    }
}

fn run() -> Result<()> {
    // clap exits with status 2 on usage errors
    let args = Args::parse();
    let config = args.tracker_config();

    info!("Extracting {} ({config:?})", args.trace.display());
    let extraction = extract_file(&args.trace, &config)
        .with_context(|| format!("Failed to extract {}", args.trace.display()))?;

    if !args.quiet {
        display_summary(&extraction, args.top);
    }

    if let Some(ref path) = args.export {
        SequenceExporter::new(&extraction)
            .pretty(args.pretty)
            .export_to_path(path)
            .with_context(|| format!("Failed to export sequences to {}", path.display()))?;

        if !args.quiet {
            println!("saved: {}", path.display());
        }
    }

    Ok(())
}
