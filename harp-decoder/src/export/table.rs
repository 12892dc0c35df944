//! Column-oriented view of decoded records
//!
//! Three fixed columns (`message_type`, `message_address`, `timestamp`) and one
//! variable-length `payload` column holding each record's elements.

use crate::types::{ElementValue, Record};
use serde::Serialize;

/// Decoded records laid out as columns
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub message_type: Vec<u8>,
    pub message_address: Vec<u8>,
    /// Seconds; NaN where the frame had no timestamp
    pub timestamp: Vec<f64>,
    pub payload: Vec<Vec<ElementValue>>,
}

impl Table {
    /// Build the table from a record list, preserving order
    pub fn from_records(records: &[Record]) -> Self {
        let mut table = Self {
            message_type: Vec::with_capacity(records.len()),
            message_address: Vec::with_capacity(records.len()),
            timestamp: Vec::with_capacity(records.len()),
            payload: Vec::with_capacity(records.len()),
        };

        for record in records {
            table.message_type.push(record.message_type);
            table.message_address.push(record.address);
            table.timestamp.push(record.timestamp_or_nan());
            table.payload.push(record.elements.clone());
        }

        table
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.message_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.message_type.is_empty()
    }

    /// Column names in order
    pub fn columns() -> [&'static str; 4] {
        ["message_type", "message_address", "timestamp", "payload"]
    }

    /// Rebuild the record at `row`
    pub fn record(&self, row: usize) -> Option<Record> {
        let timestamp = *self.timestamp.get(row)?;
        Some(Record::new(
            *self.message_type.get(row)?,
            *self.message_address.get(row)?,
            if timestamp.is_nan() { None } else { Some(timestamp) },
            self.payload.get(row)?.clone(),
        ))
    }
}

impl From<&[Record]> for Table {
    fn from(records: &[Record]) -> Self {
        Self::from_records(records)
    }
}
