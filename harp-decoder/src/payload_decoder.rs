//! Payload Decoding Engine
//!
//! Turns the payload of a single frame into numeric values: resolves the element
//! type from the payload type byte, derives the element count from the payload
//! length, fetches the unpack layout and reconstructs the optional timestamp.

use crate::frame::Frame;
use crate::layout::LayoutCache;
use crate::timestamp::TIMESTAMP_SIZE;
use crate::types::{DecoderError, ElementType, ElementValue, Result};

/// Decoded contents of one frame payload
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPayload {
    pub element_type: ElementType,
    /// Seconds, if the payload carried a timestamp
    pub timestamp: Option<f64>,
    pub elements: Vec<ElementValue>,
}

/// Payload decoder - unpacks frame payloads through a shared layout cache
pub struct PayloadDecoder<'c> {
    layouts: &'c LayoutCache,
}

impl<'c> PayloadDecoder<'c> {
    pub fn new(layouts: &'c LayoutCache) -> Self {
        Self { layouts }
    }

    /// Decode the payload of `frame`
    ///
    /// # Errors
    /// * `UnknownPayloadType` if the masked type byte is not in the type table
    /// * `MalformedPayload` if the payload is not a whole number of elements
    pub fn decode(&self, frame: &Frame<'_>) -> Result<DecodedPayload> {
        let payload_type = frame.payload_type();
        let element_type = payload_type
            .element_type()
            .ok_or(DecoderError::UnknownPayloadType {
                offset: frame.offset(),
                type_byte: payload_type.0,
            })?;

        let payload = frame.payload();
        let has_timestamp = payload_type.has_timestamp();
        let count = Self::element_count(payload.len(), has_timestamp, element_type.width())
            .ok_or(DecoderError::MalformedPayload {
                offset: frame.offset(),
                payload_len: payload.len(),
                width: element_type.width(),
                has_timestamp,
            })?;

        let layout = self.layouts.get(has_timestamp, count, element_type);
        // Element count was derived from this exact length, so the size always matches.
        let unpacked = layout
            .unpack(payload)
            .ok_or(DecoderError::MalformedPayload {
                offset: frame.offset(),
                payload_len: payload.len(),
                width: element_type.width(),
                has_timestamp,
            })?;

        Ok(DecodedPayload {
            element_type,
            timestamp: unpacked.timestamp.map(|ts| ts.as_secs_f64()),
            elements: unpacked.elements,
        })
    }

    /// Number of elements in a payload, or `None` if it does not divide evenly
    fn element_count(payload_len: usize, has_timestamp: bool, width: usize) -> Option<usize> {
        let prefix = if has_timestamp { TIMESTAMP_SIZE } else { 0 };
        let data_len = payload_len.checked_sub(prefix)?;
        if data_len % width != 0 {
            return None;
        }
        Some(data_len / width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameIterator;

    fn decode_single(data: &[u8]) -> Result<DecodedPayload> {
        let cache = LayoutCache::new();
        let frame = FrameIterator::new(data).next().unwrap()?;
        PayloadDecoder::new(&cache).decode(&frame)
    }

    #[test]
    fn test_element_count() {
        assert_eq!(PayloadDecoder::element_count(8, false, 2), Some(4));
        assert_eq!(PayloadDecoder::element_count(14, true, 4), Some(2));
        assert_eq!(PayloadDecoder::element_count(6, true, 8), Some(0));
        assert_eq!(PayloadDecoder::element_count(7, false, 2), None);
        assert_eq!(PayloadDecoder::element_count(4, true, 1), None);
    }

    #[test]
    fn test_decode_u8_without_timestamp() {
        let decoded = decode_single(&[0x01, 0x05, 0x05, 0x00, 0x01, 0x2A, 0x00]).unwrap();
        assert_eq!(decoded.element_type, ElementType::U8);
        assert_eq!(decoded.timestamp, None);
        assert_eq!(decoded.elements, vec![ElementValue::Unsigned(42)]);
    }

    #[test]
    fn test_decode_float_with_timestamp() {
        let mut data = vec![0x03, 0x0E, 0x20, 0xFF, 0x54];
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&500u16.to_le_bytes());
        data.extend_from_slice(&(-2.5f32).to_le_bytes());
        data.push(0x00); // checksum

        let decoded = decode_single(&data).unwrap();
        assert_eq!(decoded.element_type, ElementType::F32);
        assert_eq!(decoded.timestamp, Some(100.0 + 500.0 * 32e-6));
        assert_eq!(decoded.elements, vec![ElementValue::Float(-2.5)]);
    }

    #[test]
    fn test_unknown_payload_type() {
        // 0x48: float class, width 8
        let data = [0x01, 0x0C, 0x05, 0x00, 0x48, 0, 0, 0, 0, 0, 0, 0, 0, 0x00];
        match decode_single(&data) {
            Err(DecoderError::UnknownPayloadType { offset, type_byte }) => {
                assert_eq!(offset, 0);
                assert_eq!(type_byte, 0x48);
            }
            other => panic!("expected UnknownPayloadType, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_payload() {
        // u16 elements, 3 payload bytes
        let data = [0x02, 0x07, 0x05, 0x00, 0x02, 0x01, 0x02, 0x03, 0x00];
        assert!(matches!(
            decode_single(&data),
            Err(DecoderError::MalformedPayload {
                payload_len: 3,
                width: 2,
                has_timestamp: false,
                ..
            })
        ));
    }

    #[test]
    fn test_payload_shorter_than_timestamp() {
        let data = [0x03, 0x06, 0x05, 0x00, 0x11, 0x01, 0x02, 0x00];
        assert!(matches!(
            decode_single(&data),
            Err(DecoderError::MalformedPayload {
                has_timestamp: true,
                ..
            })
        ));
    }
}
