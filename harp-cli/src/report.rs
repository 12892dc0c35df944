//! Output generation
//!
//! Renders decoded records as CSV, JSON or a plain-text summary.

use crate::config::OutputFormat;
use anyhow::{Context, Result};
use harp_decoder::{export, LayoutCacheStats, MessageType, Record, Table};
use std::collections::BTreeMap;
use std::io::Write;

/// Aggregate counts over a record list
#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub per_type: BTreeMap<u8, usize>,
    pub per_address: BTreeMap<u8, usize>,
    pub timestamped: usize,
    pub first_timestamp: Option<f64>,
    pub last_timestamp: Option<f64>,
}

impl Summary {
    pub fn from_records(records: &[Record]) -> Self {
        let mut summary = Summary {
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            *summary.per_type.entry(record.message_type).or_default() += 1;
            *summary.per_address.entry(record.address).or_default() += 1;

            if let Some(ts) = record.timestamp {
                summary.timestamped += 1;
                summary.first_timestamp = Some(summary.first_timestamp.map_or(ts, |t| t.min(ts)));
                summary.last_timestamp = Some(summary.last_timestamp.map_or(ts, |t| t.max(ts)));
            }
        }

        summary
    }

    pub fn write_to<W: Write>(&self, out: &mut W, cache: &LayoutCacheStats) -> Result<()> {
        writeln!(out, "=== DECODING SUMMARY ===")?;
        writeln!(out, "Total records: {}", self.total)?;

        writeln!(out, "\nBy message type:")?;
        for (message_type, count) in &self.per_type {
            let name = MessageType::from_u8(*message_type)
                .map(|t| t.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            writeln!(out, "  {} ({}): {}", message_type, name, count)?;
        }

        writeln!(out, "\nBy register address:")?;
        for (address, count) in &self.per_address {
            writeln!(out, "  {:>3}: {}", address, count)?;
        }

        writeln!(out, "\nTimestamped records: {}", self.timestamped)?;
        if let (Some(first), Some(last)) = (self.first_timestamp, self.last_timestamp) {
            writeln!(out, "Time range: {:.6}s .. {:.6}s ({:.6}s)", first, last, last - first)?;
        }

        writeln!(
            out,
            "\nPayload layouts: {} distinct ({} hits, {} misses)",
            cache.entries, cache.hits, cache.misses
        )?;
        Ok(())
    }
}

/// Write records in the requested format
pub fn write_records<W: Write>(
    out: &mut W,
    format: OutputFormat,
    records: &[Record],
    cache: &LayoutCacheStats,
) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            export::write_csv(&mut *out, records).context("Failed to write CSV")?;
        }
        OutputFormat::Json => {
            let table = Table::from_records(records);
            serde_json::to_writer_pretty(&mut *out, &table).context("Failed to write JSON")?;
            writeln!(out)?;
        }
        OutputFormat::Summary => {
            Summary::from_records(records).write_to(out, cache)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use harp_decoder::ElementValue;

    fn sample_records() -> Vec<Record> {
        vec![
            Record::new(3, 32, Some(10.5), vec![ElementValue::Unsigned(1)]),
            Record::new(3, 32, Some(12.0), vec![ElementValue::Unsigned(2)]),
            Record::new(1, 44, None, vec![ElementValue::Signed(-3)]),
        ]
    }

    #[test]
    fn test_summary_counts() {
        let summary = Summary::from_records(&sample_records());
        assert_eq!(summary.total, 3);
        assert_eq!(summary.per_type.get(&3), Some(&2));
        assert_eq!(summary.per_type.get(&1), Some(&1));
        assert_eq!(summary.per_address.get(&32), Some(&2));
        assert_eq!(summary.timestamped, 2);
        assert_eq!(summary.first_timestamp, Some(10.5));
        assert_eq!(summary.last_timestamp, Some(12.0));
    }

    #[test]
    fn test_write_csv_format() {
        let mut out = Vec::new();
        write_records(&mut out, OutputFormat::Csv, &sample_records(), &LayoutCacheStats::default())
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Command,RegisterAddress,Timestamp,DataElement0\n"));
        assert!(text.contains("1,44,nan,-3\n"));
    }

    #[test]
    fn test_write_json_format() {
        let mut out = Vec::new();
        write_records(&mut out, OutputFormat::Json, &sample_records(), &LayoutCacheStats::default())
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["message_type"], serde_json::json!([3, 3, 1]));
        assert_eq!(value["timestamp"][2], serde_json::Value::Null);
        assert_eq!(value["payload"][2][0], serde_json::json!(-3));
    }

    #[test]
    fn test_write_summary_format() {
        let mut out = Vec::new();
        let cache = LayoutCacheStats {
            hits: 2,
            misses: 1,
            entries: 1,
        };
        write_records(&mut out, OutputFormat::Summary, &sample_records(), &cache).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Total records: 3"));
        assert!(text.contains("3 (event): 2"));
        assert!(text.contains("1 distinct (2 hits, 1 misses)"));
    }
}
