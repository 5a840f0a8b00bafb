use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::domain::ExportError;
use crate::image::SymbolIndex;

/// One segment as it appears in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRecord {
    /// Program header type name ("LOAD", "NOTE", ...)
    pub kind: String,
    /// Virtual base address, hex formatted
    pub base: String,
    pub file_size: u32,
    pub mem_size: u32,
}

/// One symbol as it appears in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub name: String,
    /// Hex formatted address
    pub address: String,
}

/// Serializable summary of a parsed image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReport {
    #[serde(rename = "entryPoint")]
    pub entry_point: String,
    pub segments: Vec<SegmentRecord>,
    pub symbols: Vec<SymbolRecord>,
    /// Segment index pairs whose address ranges overlap
    #[serde(rename = "overlappingSegments", skip_serializing_if = "Vec::is_empty", default)]
    pub overlapping_segments: Vec<(usize, usize)>,
}

impl ImageReport {
    /// Build a report from an index, keeping table order
    #[must_use]
    pub fn from_index(index: &SymbolIndex) -> Self {
        let segments = index
            .segments()
            .iter()
            .map(|seg| SegmentRecord {
                kind: seg.kind_name().to_string(),
                base: seg.base().to_string(),
                file_size: seg.file_size(),
                mem_size: seg.mem_size(),
            })
            .collect();

        let symbols = index
            .symbols()
            .map(|sym| SymbolRecord {
                name: sym.name().into_owned(),
                address: sym.address.to_string(),
            })
            .collect();

        Self {
            entry_point: index.entry_point().to_string(),
            segments,
            symbols,
            overlapping_segments: index.overlapping_segments(),
        }
    }

    /// Write the report as pretty-printed JSON
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails
    pub fn export<W: Write>(&self, mut writer: W) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
