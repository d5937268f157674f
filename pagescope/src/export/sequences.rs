use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{AddressRange, ExportError, TraceSlot, Vpn};
use crate::extract::Extraction;
use crate::tracker::TrackerStats;

/// Per-slot entry of the exported document
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotSequence<'a> {
    slot: TraceSlot,
    /// Absent for the untracked bucket
    #[serde(skip_serializing_if = "Option::is_none")]
    requested: Option<AddressRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pages_range: Option<AddressRange>,
    obsolete: bool,
    pages: &'a [Vpn],
}

/// Exported document
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SequenceDocument<'a> {
    page_shift: u32,
    global: &'a [Vpn],
    regions: Vec<SlotSequence<'a>>,
    stats: &'a TrackerStats,
}

/// JSON exporter for an extraction
pub struct SequenceExporter<'a> {
    extraction: &'a Extraction,
    pretty: bool,
}

impl<'a> SequenceExporter<'a> {
    #[must_use]
    pub fn new(extraction: &'a Extraction) -> Self {
        Self { extraction, pretty: false }
    }

    /// Indent the output (larger, but diff-friendly)
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn document(&self) -> SequenceDocument<'a> {
        let extraction = self.extraction;
        let regions = extraction
            .regions
            .iter()
            .enumerate()
            .map(|(i, pages)| {
                let slot = TraceSlot(i);
                let region = extraction.region(slot);
                SlotSequence {
                    slot,
                    requested: region.map(|r| r.requested()),
                    pages_range: region.map(|r| r.pages()),
                    obsolete: region.is_some_and(|r| r.is_obsolete()),
                    pages,
                }
            })
            .collect();

        SequenceDocument {
            page_shift: extraction.page_shift,
            global: &extraction.global,
            regions,
            stats: &extraction.stats,
        }
    }

    /// Export to any writer (file, stdout, buffer, etc.)
    ///
    /// # Errors
    /// Returns [`ExportError`] if serialisation or the write fails
    pub fn export<W: Write>(&self, mut writer: W) -> Result<(), ExportError> {
        let document = self.document();
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, &document)?;
        } else {
            serde_json::to_writer(&mut writer, &document)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Export to a file, replacing it if it exists
    ///
    /// # Errors
    /// Returns [`ExportError::Io`] if the file cannot be created
    pub fn export_to_path(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let file = File::create(path)?;
        self.export(BufWriter::new(file))
    }
}
