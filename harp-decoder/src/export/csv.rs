//! CSV export
//!
//! Writes a fixed four-column header followed by one row per record. Records
//! with more than one element produce rows longer than the header.

use crate::types::{Record, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header row; extra payload elements extend rows past `DataElement0`
pub const CSV_HEADER: [&str; 4] = ["Command", "RegisterAddress", "Timestamp", "DataElement0"];

/// Write records as CSV to any writer
pub fn write_csv<W: Write>(mut writer: W, records: &[Record]) -> Result<()> {
    writeln!(writer, "{}", CSV_HEADER.join(","))?;

    for record in records {
        let row: Vec<String> = record.to_row().iter().map(|cell| cell.to_string()).collect();
        writeln!(writer, "{}", row.join(","))?;
    }

    writer.flush()?;
    Ok(())
}

/// Export records to a CSV file
pub fn export_csv(filename: impl AsRef<Path>, records: &[Record]) -> Result<()> {
    let path = filename.as_ref();
    log::info!("Writing {} records to {:?}", records.len(), path);

    let file = File::create(path)?;
    write_csv(BufWriter::new(file), records)
}
