use thiserror::Error;

/// Faults raised by the bit-level reader and writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BitError {
    #[error("bit count must be 1-64, got {0}")]
    InvalidBitCount(usize),
    #[error("read past end of buffer")]
    OutOfBounds,
    #[error("byte operation at unaligned bit position {0}")]
    Unaligned(usize),
}

/// A category definition that violates the schema rules. Raised while
/// compiling a definition, never on the wire path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("item {item}: element {element} is {bits} bits wide, must be 1-64")]
    ElementWidth {
        item: String,
        element: String,
        bits: u16,
    },
    #[error("item {item}: no elements defined")]
    EmptyItem { item: String },
    #[error("item {item}: fixed elements sum to {bits} bits, not a whole number of octets")]
    FixedBitSum { item: String, bits: usize },
    #[error("item {item}: extended octet {octet} holds {bits} data bits, must be exactly 7")]
    OctetBitSum {
        item: String,
        octet: usize,
        bits: usize,
    },
    #[error("item {item}: repetitive element is {bits} bits wide, must be exactly 7")]
    RepetitiveWidth { item: String, bits: u16 },
    #[error("item {item}: group elements sum to {bits} bits, not a whole number of octets")]
    GroupBitSum { item: String, bits: usize },
    #[error("item {item}: group elements plus FX sum to {bits} bits, not a whole number of octets")]
    GroupFxBitSum { item: String, bits: usize },
    #[error("item {item}: sub-item {sub} holds {bits} bits, not a whole number of octets")]
    SubItemBitSum {
        item: String,
        sub: String,
        bits: usize,
    },
    #[error("category defines no UAP variants")]
    NoUapVariants,
    #[error("UAP variant {variant} references item {id}, which is not defined")]
    UnknownUapItem { variant: String, id: String },
    #[error("default UAP variant {0} is not defined")]
    UnknownDefaultVariant(String),
    #[error("UAP case references item {0}, which is not defined")]
    UnknownCaseItem(String),
    #[error("UAP case maps value {value} to unknown variant {variant}")]
    UnknownCaseVariant { value: u64, variant: String },
}

/// Faults raised while decoding a data block. They surface as the error
/// string of the invalid record or block rather than aborting the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("category {0} not registered")]
    UnknownCategory(u8),
    #[error("buffer holds {0} bytes, a data block header needs 3")]
    HeaderTooShort(usize),
    #[error("LEN field is {len} but the buffer holds {available} bytes")]
    BadBlockLength { len: u16, available: usize },
    #[error("FSPEC continues past the end of the record")]
    FspecTruncated,
    #[error("UAP variant {0} is not defined")]
    UnknownVariant(String),
    #[error("FSPEC references item {0}, which is not defined in the category")]
    UnknownItem(String),
    #[error("item {id}: needs {needed} bytes, {available} remain")]
    ItemTooShort {
        id: String,
        needed: usize,
        available: usize,
    },
    #[error("item {id}: FX continuation past the end of the record")]
    FxTruncated { id: String },
    #[error("item {id}: explicit length byte is zero")]
    ExplicitLengthZero { id: String },
    #[error("item {id}: explicit length {len} exceeds the {available} remaining bytes")]
    ExplicitTooLong {
        id: String,
        len: u8,
        available: usize,
    },
    #[error("item {id}: PSF bit set for slot {slot}, which has no sub-item definition")]
    UnknownSubItemSlot { id: String, slot: usize },
    #[error("item {id}: {source}")]
    Bits { id: String, source: BitError },
    #[error("record consumed no bytes")]
    EmptyRecord,
}

/// Faults raised while encoding. Encoding is fatal-on-error and never
/// produces partial output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("category {0} not registered")]
    UnknownCategory(u8),
    #[error("UAP variant {0} is not defined for the category")]
    UnknownVariant(String),
    #[error("record holds item {0}, which is not defined in the category")]
    UnknownItem(String),
    #[error("item {item}: sub-item {sub} is not defined")]
    UnknownSubItem { item: String, sub: String },
    #[error("item {item}: {count} groups exceed the one-byte repetition count")]
    TooManyGroups { item: String, count: usize },
    #[error("item {item}: {len}-byte payload exceeds the explicit length byte")]
    PayloadTooLong { item: String, len: usize },
    #[error("block length {0} exceeds the 16-bit LEN field")]
    BlockTooLong(usize),
    #[error(transparent)]
    Bits(#[from] BitError),
}
