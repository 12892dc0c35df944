//! HARP Log Decoder Library
//!
//! A small, reusable library for decoding binary logs written by HARP
//! (HArdware Research Platform) devices into structured records.
//!
//! # Architecture
//!
//! Decoding is a single synchronous pass over an in-memory buffer:
//! - The frame scanner carves the buffer into frames using each frame's length byte
//! - Frames are filtered by message type (read / write / event)
//! - The payload type byte selects the element type from a closed type table
//! - Payload layouts are resolved once per shape and cached
//! - Timestamped payloads get their seconds/ticks prefix turned into seconds
//!
//! The library does NOT:
//! - Validate checksums
//! - Recover from malformed or truncated frames (the whole call fails)
//! - Parse incrementally
//!
//! # Example Usage
//!
//! ```no_run
//! use harp_decoder::{export, Decoder, DecoderConfig};
//! use std::path::Path;
//!
//! let decoder = Decoder::new();
//! let config = DecoderConfig::new().with_write(false);
//!
//! let records = decoder.decode_file(Path::new("Behavior_32.bin"), &config).unwrap();
//! for record in &records {
//!     println!("{} @ {:?}: {:?}", record.address, record.timestamp, record.elements);
//! }
//!
//! export::export_csv("Behavior_32.csv", &records).unwrap();
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod export;
pub mod frame;
pub mod layout;
pub mod timestamp;
pub mod types;

// Re-export main types for convenience
pub use config::{DecoderConfig, MessageTypeFilter};
pub use decoder::{decode, Decoder, RecordIterator};
pub use export::Table;
pub use frame::{Frame, FrameIterator};
pub use layout::{LayoutCache, LayoutCacheStats, PayloadLayout};
pub use timestamp::{HarpTimestamp, TICK_SECONDS};
pub use types::{
    Cell, DecoderError, ElementDescriptor, ElementType, ElementValue, MessageType, PayloadType,
    Record, Result,
};

// Internal modules (not exposed in public API)
mod payload_decoder;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: ensure we can create a decoder
        let decoder = Decoder::new();
        let stats = decoder.cache_stats();
        assert_eq!(stats.entries, 0);
        assert!(!VERSION.is_empty());
    }
}
