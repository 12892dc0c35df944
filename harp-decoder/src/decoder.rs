//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! The Decoder struct scans a buffer for frames, filters them by message type,
//! decodes their payloads and assembles one record per retained frame.

use crate::config::{DecoderConfig, MessageTypeFilter};
use crate::frame::{Frame, FrameIterator};
use crate::layout::{LayoutCache, LayoutCacheStats};
use crate::payload_decoder::{DecodedPayload, PayloadDecoder};
use crate::types::{Record, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// The main decoder struct - entry point for all decoding operations
pub struct Decoder {
    /// Layout cache shared by every decode call on this decoder
    layouts: Arc<LayoutCache>,
}

impl Decoder {
    /// Create a new decoder with its own layout cache
    pub fn new() -> Self {
        Self {
            layouts: Arc::new(LayoutCache::new()),
        }
    }

    /// Create a decoder that uses an existing (possibly shared) layout cache
    pub fn with_layout_cache(layouts: Arc<LayoutCache>) -> Self {
        Self { layouts }
    }

    /// The layout cache this decoder resolves payloads through
    pub fn layout_cache(&self) -> &Arc<LayoutCache> {
        &self.layouts
    }

    /// Decode a whole buffer into records
    ///
    /// Any error aborts the call; no partial results are returned.
    ///
    /// # Example
    /// ```
    /// use harp_decoder::{Decoder, DecoderConfig, ElementValue};
    ///
    /// let decoder = Decoder::new();
    /// let data = [0x01, 0x05, 0x05, 0x00, 0x01, 0x2A, 0x00];
    /// let records = decoder.decode(&data, &DecoderConfig::new()).unwrap();
    ///
    /// assert_eq!(records.len(), 1);
    /// assert_eq!(records[0].elements, vec![ElementValue::Unsigned(42)]);
    /// ```
    pub fn decode(&self, data: &[u8], config: &DecoderConfig) -> Result<Vec<Record>> {
        log::debug!("Decoding {} bytes", data.len());

        let records = self.records(data, config).collect::<Result<Vec<_>>>()?;

        let stats = self.cache_stats();
        log::debug!(
            "Decoded {} records (layout cache: {} hits, {} misses, {} entries)",
            records.len(),
            stats.hits,
            stats.misses,
            stats.entries
        );
        Ok(records)
    }

    /// Lazily decode a buffer, one record per retained frame
    ///
    /// The iterator stops after the first error.
    pub fn records<'a>(&'a self, data: &'a [u8], config: &DecoderConfig) -> RecordIterator<'a> {
        RecordIterator {
            frames: FrameIterator::new(data),
            payloads: PayloadDecoder::new(&self.layouts),
            filter: config.message_filter(),
            failed: false,
        }
    }

    /// Read a HARP binary file and decode it
    ///
    /// # Example
    /// ```no_run
    /// use harp_decoder::{Decoder, DecoderConfig};
    /// use std::path::Path;
    ///
    /// let decoder = Decoder::new();
    /// let records = decoder
    ///     .decode_file(Path::new("Behavior_32.bin"), &DecoderConfig::new())
    ///     .unwrap();
    /// println!("{} records", records.len());
    /// ```
    pub fn decode_file(&self, path: &Path, config: &DecoderConfig) -> Result<Vec<Record>> {
        log::info!("Decoding HARP file: {:?}", path);

        let data = fs::read(path)?;
        let records = self.decode(&data, config)?;

        log::info!("Decoded {} records from {:?}", records.len(), path);
        Ok(records)
    }

    /// Get statistics about the layout cache
    pub fn cache_stats(&self) -> LayoutCacheStats {
        self.layouts.stats()
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator that turns frames into records
///
/// For each frame:
/// 1. Read the message type → skip the frame if it is filtered out
/// 2. Decode the payload
/// 3. Assemble the record
pub struct RecordIterator<'a> {
    frames: FrameIterator<'a>,
    payloads: PayloadDecoder<'a>,
    filter: MessageTypeFilter,
    failed: bool,
}

impl<'a> RecordIterator<'a> {
    /// Decode a retained frame into a record
    fn process_frame(&self, frame: &Frame<'_>) -> Result<Record> {
        let DecodedPayload {
            element_type,
            timestamp,
            elements,
        } = self.payloads.decode(frame)?;

        log::trace!(
            "Decoded {} x {} from frame at offset {}",
            elements.len(),
            element_type,
            frame.offset()
        );

        Ok(Record::new(
            frame.message_type(),
            frame.address(),
            timestamp,
            elements,
        ))
    }
}

impl<'a> Iterator for RecordIterator<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let frame = match self.frames.next()? {
                Ok(frame) => frame,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };

            if !self.filter.contains_raw(frame.message_type()) {
                log::trace!(
                    "Skipping frame at offset {} (message type {})",
                    frame.offset(),
                    frame.message_type()
                );
                continue;
            }

            let result = self.process_frame(&frame);
            if result.is_err() {
                self.failed = true;
            }
            return Some(result);
        }
    }
}

/// Decode a buffer, selecting message categories with three flags
///
/// # Example
/// ```
/// let data = [0x02, 0x05, 0x07, 0x00, 0x81, 0xFF, 0x00];
/// let records = harp_decoder::decode(&data, true, true, true).unwrap();
/// assert_eq!(records[0].address, 7);
/// ```
pub fn decode(
    data: &[u8],
    include_read: bool,
    include_write: bool,
    include_event: bool,
) -> Result<Vec<Record>> {
    let config = DecoderConfig::new()
        .with_read(include_read)
        .with_write(include_write)
        .with_event(include_event);
    Decoder::new().decode(data, &config)
}
