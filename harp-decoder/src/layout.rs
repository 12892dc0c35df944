//! Payload layout resolution
//!
//! A layout is the ordered list of primitive fields a payload is unpacked into:
//! an optional seconds/ticks timestamp prefix followed by `count` elements of a
//! single type. Layouts depend only on the timestamp flag, the element count and
//! the masked type key, so they are memoized in a [`LayoutCache`] owned by the
//! decoder.

use crate::timestamp::{HarpTimestamp, TIMESTAMP_SIZE};
use crate::types::{ElementType, ElementValue};
use byteorder::{ByteOrder, LittleEndian};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Key a layout is cached under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutKey {
    pub has_timestamp: bool,
    pub count: usize,
    pub masked_key: u8,
}

/// Resolved unpack layout for one payload shape
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadLayout {
    has_timestamp: bool,
    element_type: ElementType,
    fields: Vec<ElementType>,
    size: usize,
}

/// Values unpacked from a payload
#[derive(Debug, Clone, PartialEq)]
pub struct Unpacked {
    /// Raw seconds/ticks if the layout carries a timestamp
    pub timestamp: Option<HarpTimestamp>,
    /// Element values in payload order
    pub elements: Vec<ElementValue>,
}

impl PayloadLayout {
    /// Build the field list for a payload shape
    pub fn resolve(has_timestamp: bool, count: usize, element_type: ElementType) -> Self {
        let prefix = if has_timestamp { 2 } else { 0 };
        let mut fields = Vec::with_capacity(prefix + count);
        if has_timestamp {
            fields.push(ElementType::U32);
            fields.push(ElementType::U16);
        }
        fields.extend(std::iter::repeat(element_type).take(count));

        let prefix_bytes = if has_timestamp { TIMESTAMP_SIZE } else { 0 };
        let size = prefix_bytes + count * element_type.width();

        Self {
            has_timestamp,
            element_type,
            fields,
            size,
        }
    }

    pub fn has_timestamp(&self) -> bool {
        self.has_timestamp
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Number of data elements (timestamp fields excluded)
    pub fn count(&self) -> usize {
        self.fields.len() - if self.has_timestamp { 2 } else { 0 }
    }

    /// All primitive fields in unpack order, timestamp fields included
    pub fn fields(&self) -> &[ElementType] {
        &self.fields
    }

    /// Total payload size in bytes this layout consumes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Unpack a payload of exactly [`size`](Self::size) bytes.
    ///
    /// Returns `None` if `bytes` has the wrong length.
    pub fn unpack(&self, bytes: &[u8]) -> Option<Unpacked> {
        if bytes.len() != self.size {
            return None;
        }

        let mut offset = 0;
        let timestamp = if self.has_timestamp {
            let seconds = LittleEndian::read_u32(&bytes[0..4]);
            let ticks = LittleEndian::read_u16(&bytes[4..6]);
            offset = TIMESTAMP_SIZE;
            Some(HarpTimestamp::new(seconds, ticks))
        } else {
            None
        };

        let width = self.element_type.width();
        let elements = bytes[offset..]
            .chunks_exact(width)
            .map(|chunk| read_element(self.element_type, chunk))
            .collect();

        Some(Unpacked {
            timestamp,
            elements,
        })
    }
}

/// Read one little-endian element; `chunk` must be exactly the element width
fn read_element(element_type: ElementType, chunk: &[u8]) -> ElementValue {
    match element_type {
        ElementType::U8 => ElementValue::Unsigned(u64::from(chunk[0])),
        ElementType::U16 => ElementValue::Unsigned(u64::from(LittleEndian::read_u16(chunk))),
        ElementType::U32 => ElementValue::Unsigned(u64::from(LittleEndian::read_u32(chunk))),
        ElementType::U64 => ElementValue::Unsigned(LittleEndian::read_u64(chunk)),
        ElementType::I8 => ElementValue::Signed(i64::from(chunk[0] as i8)),
        ElementType::I16 => ElementValue::Signed(i64::from(LittleEndian::read_i16(chunk))),
        ElementType::I32 => ElementValue::Signed(i64::from(LittleEndian::read_i32(chunk))),
        ElementType::I64 => ElementValue::Signed(LittleEndian::read_i64(chunk)),
        ElementType::F32 => ElementValue::Float(LittleEndian::read_f32(chunk)),
    }
}

/// Statistics about a layout cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutCacheStats {
    /// Lookups answered from the cache
    pub hits: usize,
    /// Lookups that resolved a new layout
    pub misses: usize,
    /// Distinct layouts currently cached
    pub entries: usize,
}

/// Memoized layouts keyed by `(has_timestamp, count, masked_key)`
///
/// Entries are immutable once inserted, so the cache can be shared between
/// decoders (and threads) behind an `Arc`.
#[derive(Debug, Default)]
pub struct LayoutCache {
    layouts: RwLock<HashMap<LayoutKey, Arc<PayloadLayout>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the layout for a payload shape, resolving it on first use
    pub fn get(
        &self,
        has_timestamp: bool,
        count: usize,
        element_type: ElementType,
    ) -> Arc<PayloadLayout> {
        let key = LayoutKey {
            has_timestamp,
            count,
            masked_key: element_type.masked_key(),
        };

        // A poisoned lock still holds valid entries; they are never mutated in place.
        if let Some(layout) = self
            .layouts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(layout);
        }

        let mut layouts = self.layouts.write().unwrap_or_else(|e| e.into_inner());
        if let Some(layout) = layouts.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(layout);
        }

        log::trace!(
            "Resolving payload layout: {} x {} (timestamp: {})",
            count,
            element_type,
            has_timestamp
        );
        self.misses.fetch_add(1, Ordering::Relaxed);
        let layout = Arc::new(PayloadLayout::resolve(has_timestamp, count, element_type));
        layouts.insert(key, Arc::clone(&layout));
        layout
    }

    /// Drop every cached layout and reset the counters
    pub fn clear(&self) {
        self.layouts.write().unwrap_or_else(|e| e.into_inner()).clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> LayoutCacheStats {
        LayoutCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.layouts.read().unwrap_or_else(|e| e.into_inner()).len(),
        }
    }
}
