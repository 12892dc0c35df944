//! HARP frame scanner
//!
//! Walks an in-memory byte buffer and carves it into frames using the length
//! byte each frame carries. Frames are borrowed views; nothing is copied.
//!
//! ## Wire layout
//! ```text
//! ┌──────┬────────┬─────────┬──────┬──────────────┬─────────────┬──────────┐
//! │ type │ length │ address │ port │ payload type │ payload ... │ checksum │
//! │  1B  │   1B   │   1B    │  1B  │      1B      │   n bytes   │    1B    │
//! └──────┴────────┴─────────┴──────┴──────────────┴─────────────┴──────────┘
//! ```
//! `length` counts every byte after itself, checksum included, so a frame spans
//! `length + 2` bytes and its payload is `length - 4` bytes. The checksum is
//! never validated.

use crate::types::{DecoderError, PayloadType, Result};

/// Bytes before the payload: type, length, address, port, payload type
pub const HEADER_SIZE: usize = 5;

/// Smallest legal value of the length byte (address, port, payload type, checksum)
pub const MIN_LENGTH: u8 = 4;

/// A single frame borrowed from the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    offset: usize,
    bytes: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Byte offset of this frame in the input buffer
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Raw frame bytes, checksum included
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn message_type(&self) -> u8 {
        self.bytes[0]
    }

    pub fn length(&self) -> u8 {
        self.bytes[1]
    }

    pub fn address(&self) -> u8 {
        self.bytes[2]
    }

    pub fn port(&self) -> u8 {
        self.bytes[3]
    }

    pub fn payload_type(&self) -> PayloadType {
        PayloadType(self.bytes[4])
    }

    /// Payload bytes, timestamp prefix included, checksum excluded
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[HEADER_SIZE..self.bytes.len() - 1]
    }

    /// Trailing checksum byte (not validated)
    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }
}

/// Lazy iterator over the frames of a buffer
///
/// Yields frames in buffer order. The first error ends iteration.
#[derive(Debug, Clone)]
pub struct FrameIterator<'a> {
    data: &'a [u8],
    next_start: usize,
    failed: bool,
}

impl<'a> FrameIterator<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            next_start: 0,
            failed: false,
        }
    }

    /// Offset the next frame will be read from
    pub fn position(&self) -> usize {
        self.next_start
    }

    fn read_frame(&self, start: usize) -> Result<Frame<'a>> {
        let available = self.data.len();

        let length = *self.data.get(start + 1).ok_or(DecoderError::TruncatedFrame {
            offset: start,
            needed: 2,
            available: available - start,
        })?;

        if length < MIN_LENGTH {
            return Err(DecoderError::MalformedFrame {
                offset: start,
                length,
            });
        }

        let frame_size = length as usize + 2;
        let end = start + frame_size;
        if end > available {
            return Err(DecoderError::TruncatedFrame {
                offset: start,
                needed: frame_size,
                available: available - start,
            });
        }

        Ok(Frame {
            offset: start,
            bytes: &self.data[start..end],
        })
    }
}

impl<'a> Iterator for FrameIterator<'a> {
    type Item = Result<Frame<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next_start >= self.data.len() {
            return None;
        }

        match self.read_frame(self.next_start) {
            Ok(frame) => {
                log::trace!(
                    "Frame at offset {}: type {} length {}",
                    frame.offset(),
                    frame.message_type(),
                    frame.length()
                );
                self.next_start += frame.as_bytes().len();
                Some(Ok(frame))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_frame_fields() {
        let data = [0x01, 0x05, 0x20, 0xFF, 0x01, 0x2A, 0x55];
        let mut frames = FrameIterator::new(&data);

        let frame = frames.next().unwrap().unwrap();
        assert_eq!(frame.offset(), 0);
        assert_eq!(frame.message_type(), 1);
        assert_eq!(frame.length(), 5);
        assert_eq!(frame.address(), 0x20);
        assert_eq!(frame.port(), 0xFF);
        assert_eq!(frame.payload_type(), PayloadType(0x01));
        assert_eq!(frame.payload(), &[0x2A]);
        assert_eq!(frame.checksum(), 0x55);

        assert!(frames.next().is_none());
        assert_eq!(frames.position(), data.len());
    }

    #[test]
    fn test_consecutive_frames() {
        let data = [
            0x02, 0x06, 0x01, 0xFF, 0x01, 0x0A, 0x0B, 0x00, // two u8 elements
            0x03, 0x04, 0x02, 0xFF, 0x01, 0x00, // empty payload
        ];
        let frames: Vec<_> = FrameIterator::new(&data)
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].offset(), 0);
        assert_eq!(frames[0].payload(), &[0x0A, 0x0B]);
        assert_eq!(frames[1].offset(), 8);
        assert_eq!(frames[1].message_type(), 3);
        assert!(frames[1].payload().is_empty());
    }

    #[test]
    fn test_empty_buffer() {
        assert!(FrameIterator::new(&[]).next().is_none());
    }

    #[test]
    fn test_truncated_frame() {
        // Declares 7 trailing bytes but only 6 follow
        let data = [0x01, 0x07, 0x05, 0x00, 0x01, 0x2A, 0x00, 0x11];
        let mut frames = FrameIterator::new(&data);

        match frames.next() {
            Some(Err(DecoderError::TruncatedFrame {
                offset,
                needed,
                available,
            })) => {
                assert_eq!(offset, 0);
                assert_eq!(needed, 9);
                assert_eq!(available, 8);
            }
            other => panic!("expected TruncatedFrame, got {:?}", other),
        }
        assert!(frames.next().is_none());
    }

    #[test]
    fn test_missing_length_byte() {
        let data = [0x01, 0x04, 0x00, 0xFF, 0x01, 0x00, 0x03];
        let results: Vec<_> = FrameIterator::new(&data).collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(DecoderError::TruncatedFrame { offset: 6, .. })
        ));
    }

    #[test]
    fn test_length_shorter_than_header() {
        let data = [0x01, 0x02, 0x00, 0x00];
        let result = FrameIterator::new(&data).next().unwrap();
        assert!(matches!(
            result,
            Err(DecoderError::MalformedFrame { offset: 0, length: 2 })
        ));
    }
}
