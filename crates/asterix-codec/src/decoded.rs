//! The decoded value tree: plain owned data produced by decoding, and
//! the input to encoding. Values never alias the wire buffer.

use std::collections::BTreeMap;

/// Structural kind tag carried on decoded items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFormat {
    Fixed,
    Extended,
    Repetitive,
    RepetitiveGroup,
    RepetitiveGroupFx,
    Explicit,
    Compound,
}

/// Decoded content of one Data Item.
///
/// Only the container matching the item's format is populated. Every
/// value is the raw unsigned integer read from the wire; sign, scale,
/// and unit interpretation belong to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedItem {
    pub item_id: String,
    pub format: ItemFormat,
    /// Flat named fields of Fixed and Extended items. Spares never
    /// appear here.
    pub fields: BTreeMap<String, u64>,
    /// The 7-bit values of a Repetitive item, in wire order.
    pub repetitions: Vec<u64>,
    /// One field map per group of a RepetitiveGroup / RepetitiveGroupFx
    /// item, in wire order.
    pub group_repetitions: Vec<BTreeMap<String, u64>>,
    /// Explicit/SP payload, without the length byte.
    pub raw_bytes: Vec<u8>,
    /// Present Compound sub-items, keyed by sub-item name.
    pub compound_sub_fields: BTreeMap<String, BTreeMap<String, u64>>,
}

impl DecodedItem {
    pub fn new(item_id: &str, format: ItemFormat) -> Self {
        DecodedItem {
            item_id: item_id.to_string(),
            format,
            fields: BTreeMap::new(),
            repetitions: Vec::new(),
            group_repetitions: Vec::new(),
            raw_bytes: Vec::new(),
            compound_sub_fields: BTreeMap::new(),
        }
    }

    /// Convenience lookup into the flat field map.
    pub fn field(&self, name: &str) -> Option<u64> {
        self.fields.get(name).copied()
    }

    /// Builder-style insertion into the flat field map.
    pub fn with_field(mut self, name: &str, value: u64) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }
}

/// A decoded Data Record: its present items and the UAP variant they
/// were decoded under.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub items: BTreeMap<String, DecodedItem>,
    pub uap_variant: String,
    pub valid: bool,
    pub error: Option<String>,
}

impl DecodedRecord {
    pub fn new() -> Self {
        DecodedRecord {
            items: BTreeMap::new(),
            uap_variant: String::new(),
            valid: true,
            error: None,
        }
    }

    pub fn insert(&mut self, item: DecodedItem) {
        self.items.insert(item.item_id.clone(), item);
    }

    pub fn item(&self, id: &str) -> Option<&DecodedItem> {
        self.items.get(id)
    }
}

impl Default for DecodedRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// A decoded Data Block. `valid` is false when decoding stopped early;
/// records decoded before the fault are retained for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBlock {
    pub cat: u8,
    pub length: u16,
    pub records: Vec<DecodedRecord>,
    pub valid: bool,
    pub error: Option<String>,
}

impl DecodedBlock {
    pub fn new() -> Self {
        DecodedBlock {
            cat: 0,
            length: 0,
            records: Vec::new(),
            valid: true,
            error: None,
        }
    }
}

impl Default for DecodedBlock {
    fn default() -> Self {
        Self::new()
    }
}
