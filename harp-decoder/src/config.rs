//! Decoder configuration types
//!
//! This module defines the minimal configuration needed by the decoder library:
//! which message categories are turned into records. Output formats and file
//! handling live in the application layer.

use crate::types::{DecoderError, MessageType, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Configuration for the decoder library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Decode read messages (type 1)
    #[serde(default = "default_true")]
    pub include_read: bool,

    /// Decode write messages (type 2)
    #[serde(default = "default_true")]
    pub include_write: bool,

    /// Decode event messages (type 3)
    #[serde(default = "default_true")]
    pub include_event: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            include_read: true,
            include_write: true,
            include_event: true,
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings (all categories)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: include or exclude read messages
    pub fn with_read(mut self, enabled: bool) -> Self {
        self.include_read = enabled;
        self
    }

    /// Builder method: include or exclude write messages
    pub fn with_write(mut self, enabled: bool) -> Self {
        self.include_write = enabled;
        self
    }

    /// Builder method: include or exclude event messages
    pub fn with_event(mut self, enabled: bool) -> Self {
        self.include_event = enabled;
        self
    }

    /// Builder method: include exactly the given categories
    pub fn with_message_types(self, filter: &MessageTypeFilter) -> Self {
        self.with_read(filter.contains(MessageType::Read))
            .with_write(filter.contains(MessageType::Write))
            .with_event(filter.contains(MessageType::Event))
    }

    /// The explicit set of categories to decode; frames of any other type are skipped
    pub fn message_filter(&self) -> MessageTypeFilter {
        MessageTypeFilter::from_flags(self.include_read, self.include_write, self.include_event)
    }
}

/// Set of message categories to decode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTypeFilter {
    types: BTreeSet<u8>,
}

impl MessageTypeFilter {
    /// Build the set from three independent flags
    pub fn from_flags(read: bool, write: bool, event: bool) -> Self {
        let mut filter = Self::default();
        if read {
            filter.insert(MessageType::Read);
        }
        if write {
            filter.insert(MessageType::Write);
        }
        if event {
            filter.insert(MessageType::Event);
        }
        filter
    }

    /// Parse category names (`read`, `write`, `event`, case-insensitive)
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut filter = Self::default();
        for name in names {
            let message_type = match name.as_ref().trim().to_ascii_lowercase().as_str() {
                "read" => MessageType::Read,
                "write" => MessageType::Write,
                "event" => MessageType::Event,
                other => {
                    return Err(DecoderError::InvalidMessageTypeFilter(format!(
                        "unknown message type '{}' (expected read, write or event)",
                        other
                    )))
                }
            };
            filter.insert(message_type);
        }
        Ok(filter)
    }

    pub fn insert(&mut self, message_type: MessageType) {
        self.types.insert(message_type.as_u8());
    }

    pub fn contains(&self, message_type: MessageType) -> bool {
        self.types.contains(&message_type.as_u8())
    }

    /// Check a raw message type byte against the set
    pub fn contains_raw(&self, message_type: u8) -> bool {
        self.types.contains(&message_type)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Raw message type values in ascending order
    pub fn raw_types(&self) -> Vec<u8> {
        self.types.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_config_builder() {
        let config = DecoderConfig::new().with_write(false);

        assert!(config.include_read);
        assert!(!config.include_write);
        assert!(config.include_event);
        assert_eq!(config.message_filter().raw_types(), vec![1, 3]);
    }

    #[test]
    fn test_filter_without_event_is_still_built() {
        // Read and write only must still yield a usable set
        let filter = MessageTypeFilter::from_flags(true, true, false);
        assert_eq!(filter.raw_types(), vec![1, 2]);

        let filter = DecoderConfig::new().with_event(false).message_filter();
        assert!(filter.contains_raw(1));
        assert!(filter.contains_raw(2));
        assert!(!filter.contains_raw(3));
    }

    #[test]
    fn test_no_categories() {
        let config = DecoderConfig::new()
            .with_read(false)
            .with_write(false)
            .with_event(false);
        assert!(config.message_filter().is_empty());
        assert!(!config.message_filter().contains_raw(1));
    }

    #[test]
    fn test_unclassified_types_never_processed() {
        let filter = DecoderConfig::new().message_filter();
        assert_eq!(filter.raw_types(), vec![1, 2, 3]);
        assert!(!filter.contains_raw(0));
        assert!(!filter.contains_raw(4));
        assert!(!filter.contains_raw(0xFF));
    }

    #[test]
    fn test_filter_from_names() {
        let filter = MessageTypeFilter::from_names(&["Read", " event "]).unwrap();
        assert!(filter.contains(MessageType::Read));
        assert!(!filter.contains(MessageType::Write));
        assert!(filter.contains_raw(3));

        let config = DecoderConfig::new().with_message_types(&filter);
        assert_eq!(config, DecoderConfig::new().with_write(false));
    }

    #[test]
    fn test_filter_from_unknown_name() {
        let result = MessageTypeFilter::from_names(&["read", "status"]);
        assert!(matches!(
            result,
            Err(DecoderError::InvalidMessageTypeFilter(msg)) if msg.contains("status")
        ));
    }

    #[test]
    fn test_config_deserialization_defaults() {
        let config: DecoderConfig = serde_json::from_str(r#"{"include_write": false}"#).unwrap();
        assert!(config.include_read);
        assert!(!config.include_write);
        assert!(config.include_event);
    }
}
