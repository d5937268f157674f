use anyhow::{Context, Result};
use clap::Parser;
use pagescope::trace::{TraceEvent, TraceWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Parser)]
enum Cmd {
    /// Write a deterministic synthetic trace
    Synth {
        #[arg(long, default_value = "synth.trace")]
        out: PathBuf,
        /// Number of tracked arrays allocated up front
        #[arg(long, default_value = "4")]
        regions: u64,
        /// Pages per array
        #[arg(long, default_value = "64")]
        pages: u64,
        /// Sequential sweeps over every array
        #[arg(long, default_value = "8")]
        sweeps: u64,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Cmd::Synth { out, regions, pages, sweeps } => synth(&out, regions, pages, sweeps)?,
    }

    Ok(())
}

const PAGE: u64 = 4096;
const HEAP_BASE: u64 = 0x5555_0000_0000;
const STACK_BASE: u64 = 0x7ffd_0000_0000;

/// Arrays swept in turn, interleaved with stack traffic, then grown by
/// realloc and freed, roughly what a blocked numeric kernel looks like.
fn synth(out: &Path, regions: u64, pages: u64, sweeps: u64) -> Result<()> {
    let size = pages * PAGE;
    // Leave a guard page between arrays so realloc growth never collides
    let stride = 2 * size + PAGE;
    let base = |i: u64| HEAP_BASE + i * stride;

    let file = File::create(out).with_context(|| format!("Failed to create {}", out.display()))?;
    let mut writer = TraceWriter::new(BufWriter::new(file));
    let mut icount = 0u64;

    for i in 0..regions {
        writer.write_event(&TraceEvent::Allocate { address: base(i), size })?;
    }

    for sweep in 0..sweeps {
        for i in 0..regions {
            for page in 0..pages {
                for offset in (0..PAGE).step_by(1024) {
                    let address = base(i) + page * PAGE + offset;
                    writer.write_event(&TraceEvent::Reference { address, size: 8 })?;
                }
                writer.write_event(&TraceEvent::Reference { address: STACK_BASE - 64, size: 8 })?;
                icount += 32;
            }
        }
        writer.write_event(&TraceEvent::InstructionCount { count: icount })?;

        if sweep + 1 == sweeps / 2 {
            for i in 0..regions {
                writer.write_event(&TraceEvent::Reallocate {
                    new_address: base(i),
                    old_address: base(i),
                    size: 2 * size,
                })?;
            }
        }
    }

    for i in 0..regions {
        writer.write_event(&TraceEvent::Free { address: base(i) })?;
    }

    let records = writer.records();
    writer.into_inner().context("Failed to flush trace")?;

    println!("✓ synthetic trace written");
    println!("  Path: {}", out.display());
    println!("  Records: {records}");

    Ok(())
}
