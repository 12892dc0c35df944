//! Core types for the HARP decoder library
//!
//! This module defines the payload type table, the records the decoder emits and
//! the error type shared by every decoding stage. The decoder is stateless apart
//! from its layout cache and only outputs records - it does not interpret register
//! semantics of any particular HARP device.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Bit 4 of the payload type byte: the payload starts with a timestamp
pub const HAS_TIMESTAMP: u8 = 0x10;

/// Bits 0-3 of the payload type byte: element width in bytes
pub const SIZE_MASK: u8 = 0x0F;

/// Bits 6-7 of the payload type byte: numeric class
pub const CLASS_MASK: u8 = 0xC0;

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Unknown payload type 0x{type_byte:02X} in frame at offset {offset}")]
    UnknownPayloadType { offset: usize, type_byte: u8 },

    #[error(
        "Malformed payload in frame at offset {offset}: {payload_len} bytes \
         (timestamp: {has_timestamp}) is not a whole number of {width}-byte elements"
    )]
    MalformedPayload {
        offset: usize,
        payload_len: usize,
        width: usize,
        has_timestamp: bool,
    },

    #[error("Truncated frame at offset {offset}: needs {needed} bytes, buffer has {available}")]
    TruncatedFrame {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Malformed frame at offset {offset}: length {length} is below the header size")]
    MalformedFrame { offset: usize, length: u8 },

    #[error("Invalid message type filter: {0}")]
    InvalidMessageTypeFilter(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// HARP message categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Register read (1)
    Read,
    /// Register write (2)
    Write,
    /// Device event (3)
    Event,
}

impl MessageType {
    /// Classify a raw message type byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(MessageType::Read),
            2 => Some(MessageType::Write),
            3 => Some(MessageType::Event),
            _ => None,
        }
    }

    /// Raw wire value of this category
    pub fn as_u8(self) -> u8 {
        match self {
            MessageType::Read => 1,
            MessageType::Write => 2,
            MessageType::Event => 3,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Read => write!(f, "read"),
            MessageType::Write => write!(f, "write"),
            MessageType::Event => write!(f, "event"),
        }
    }
}

/// Primitive element types a payload can carry
///
/// This is the closed type table: the only combinations of numeric class and
/// width a payload type byte may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
}

/// Width and numeric class of an element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementDescriptor {
    /// Width in bytes
    pub width: usize,
    /// True for signed integers and floats
    pub signed: bool,
    /// True for IEEE floats
    pub float: bool,
}

impl ElementType {
    /// All entries of the type table
    pub const ALL: [ElementType; 9] = [
        ElementType::U8,
        ElementType::U16,
        ElementType::U32,
        ElementType::U64,
        ElementType::I8,
        ElementType::I16,
        ElementType::I32,
        ElementType::I64,
        ElementType::F32,
    ];

    /// Look up a masked key (class bits and width bits only)
    pub fn from_masked_key(key: u8) -> Option<Self> {
        match key {
            0x01 => Some(ElementType::U8),
            0x02 => Some(ElementType::U16),
            0x04 => Some(ElementType::U32),
            0x08 => Some(ElementType::U64),
            0x81 => Some(ElementType::I8),
            0x82 => Some(ElementType::I16),
            0x84 => Some(ElementType::I32),
            0x88 => Some(ElementType::I64),
            0x44 => Some(ElementType::F32),
            _ => None,
        }
    }

    /// Look up a raw payload type byte, ignoring the timestamp and reserved bits
    pub fn from_type_byte(type_byte: u8) -> Option<Self> {
        Self::from_masked_key(PayloadType(type_byte).masked_key())
    }

    /// The masked key this type is stored under
    pub fn masked_key(self) -> u8 {
        match self {
            ElementType::U8 => 0x01,
            ElementType::U16 => 0x02,
            ElementType::U32 => 0x04,
            ElementType::U64 => 0x08,
            ElementType::I8 => 0x81,
            ElementType::I16 => 0x82,
            ElementType::I32 => 0x84,
            ElementType::I64 => 0x88,
            ElementType::F32 => 0x44,
        }
    }

    /// Element width in bytes
    pub fn width(self) -> usize {
        match self {
            ElementType::U8 | ElementType::I8 => 1,
            ElementType::U16 | ElementType::I16 => 2,
            ElementType::U32 | ElementType::I32 | ElementType::F32 => 4,
            ElementType::U64 | ElementType::I64 => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        !matches!(
            self,
            ElementType::U8 | ElementType::U16 | ElementType::U32 | ElementType::U64
        )
    }

    pub fn is_float(self) -> bool {
        self == ElementType::F32
    }

    /// Width and class as a plain descriptor
    pub fn descriptor(self) -> ElementDescriptor {
        ElementDescriptor {
            width: self.width(),
            signed: self.is_signed(),
            float: self.is_float(),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::U8 => "u8",
            ElementType::U16 => "u16",
            ElementType::U32 => "u32",
            ElementType::U64 => "u64",
            ElementType::I8 => "i8",
            ElementType::I16 => "i16",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
            ElementType::F32 => "f32",
        };
        write!(f, "{}", name)
    }
}

/// Raw payload type byte of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadType(pub u8);

impl PayloadType {
    /// True if the payload is prefixed with a seconds/ticks timestamp
    pub fn has_timestamp(self) -> bool {
        self.0 & HAS_TIMESTAMP != 0
    }

    /// Type table key: bits 0-3 and 6-7, timestamp and reserved bits cleared
    pub fn masked_key(self) -> u8 {
        (self.0 & CLASS_MASK) | (self.0 & SIZE_MASK)
    }

    /// Resolve the element type through the type table
    pub fn element_type(self) -> Option<ElementType> {
        ElementType::from_masked_key(self.masked_key())
    }
}

/// One decoded payload element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementValue {
    /// Any unsigned integer element (u8..u64)
    Unsigned(u64),
    /// Any signed integer element (i8..i64)
    Signed(i64),
    /// Single precision float element
    Float(f32),
}

impl fmt::Display for ElementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementValue::Unsigned(v) => write!(f, "{}", v),
            ElementValue::Signed(v) => write!(f, "{}", v),
            ElementValue::Float(v) => write!(f, "{}", format_float(f64::from(*v))),
        }
    }
}

/// One decoded frame - the primary output of the decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Raw message type (1=read, 2=write, 3=event)
    pub message_type: u8,
    /// Register address
    pub address: u8,
    /// Hardware timestamp in seconds, if the frame carried one
    pub timestamp: Option<f64>,
    /// Payload elements, timestamp fields excluded
    pub elements: Vec<ElementValue>,
}

/// One field of a flattened record row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Integer(u8),
    Timestamp(Option<f64>),
    Element(ElementValue),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Timestamp(Some(v)) => write!(f, "{}", format_float(*v)),
            Cell::Timestamp(None) => write!(f, "nan"),
            Cell::Element(v) => write!(f, "{}", v),
        }
    }
}

impl Record {
    /// Assemble a record from its decoded parts
    pub fn new(
        message_type: u8,
        address: u8,
        timestamp: Option<f64>,
        elements: Vec<ElementValue>,
    ) -> Self {
        Self {
            message_type,
            address,
            timestamp,
            elements,
        }
    }

    /// Message category, if the type is one of read/write/event
    pub fn kind(&self) -> Option<MessageType> {
        MessageType::from_u8(self.message_type)
    }

    /// Timestamp with NaN standing in for "unavailable"
    pub fn timestamp_or_nan(&self) -> f64 {
        self.timestamp.unwrap_or(f64::NAN)
    }

    /// Flatten into `[message_type, address, timestamp, elements...]`
    pub fn to_row(&self) -> Vec<Cell> {
        let mut row = Vec::with_capacity(3 + self.elements.len());
        row.push(Cell::Integer(self.message_type));
        row.push(Cell::Integer(self.address));
        row.push(Cell::Timestamp(self.timestamp));
        row.extend(self.elements.iter().copied().map(Cell::Element));
        row
    }
}

/// Render a float the way the HARP tooling always has: shortest round-trip
/// digits, integral values keep a trailing `.0`, NaN is `nan`.
///
/// Values below 1e-4 or from 1e16 up switch to exponent form with a signed,
/// at least two digit exponent (`3.2e-05`, `1e+16`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return (if value > 0.0 { "inf" } else { "-inf" }).to_string();
    }

    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}
