//! The codec proper: category registry, record orchestration, and data
//! block framing.
//!
//! Wire format reminder:
//!
//! ```text
//! Data Block  = [CAT 1B][LEN 2B big-endian][Record...]
//! Data Record = [FSPEC bytes][Item bytes...]
//! ```

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::{
    category::{Category, RFS_SLOT, UNUSED_SLOT},
    decoded::{DecodedBlock, DecodedRecord},
    errors::{DecodeError, EncodeError},
    fspec::Fspec,
    item::Presence,
};

/// Decode/encode engine over a set of registered categories.
///
/// Registration is expected at startup; `decode` and `encode` are then
/// pure functions of the registry snapshot and their input.
#[derive(Debug, Default)]
pub struct Codec {
    categories: BTreeMap<u8, Category>,
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a category, replacing any earlier registration of the
    /// same number.
    pub fn register_category(&mut self, category: Category) {
        self.categories.insert(category.cat, category);
    }

    pub fn category(&self, cat: u8) -> Option<&Category> {
        self.categories.get(&cat)
    }

    /// Decodes a complete data block.
    ///
    /// This never fails outright: malformed input surfaces as
    /// `valid = false` plus an error string on the block, and records
    /// decoded before the fault are retained for inspection. A record
    /// missing one of its mandatory items is marked invalid but does
    /// not stop the block.
    pub fn decode(&self, buf: &[u8]) -> DecodedBlock {
        let mut block = DecodedBlock::new();

        if buf.len() < 3 {
            return fail_block(block, DecodeError::HeaderTooShort(buf.len()));
        }
        block.cat = buf[0];
        block.length = u16::from_be_bytes([buf[1], buf[2]]);
        if block.length < 3 || usize::from(block.length) > buf.len() {
            let len = block.length;
            let available = buf.len();
            return fail_block(block, DecodeError::BadBlockLength { len, available });
        }

        let Some(category) = self.category(block.cat) else {
            let cat = block.cat;
            return fail_block(block, DecodeError::UnknownCategory(cat));
        };
        debug!(cat = block.cat, len = block.length, "decoding data block");

        let payload = &buf[3..usize::from(block.length)];
        let mut pos = 0;
        while pos < payload.len() {
            match decode_record(&payload[pos..], category) {
                Ok((record, consumed)) => {
                    block.records.push(record);
                    if consumed == 0 {
                        return fail_block(block, DecodeError::EmptyRecord);
                    }
                    pos += consumed;
                }
                Err((partial, err)) => {
                    block.records.push(partial);
                    return fail_block(block, err);
                }
            }
        }

        debug!(records = block.records.len(), "data block decoded");
        block
    }

    /// Encodes `records` into one data block for category `cat`.
    /// Failures are fatal; no partial output is ever returned.
    pub fn encode(&self, cat: u8, records: &[DecodedRecord]) -> Result<Vec<u8>, EncodeError> {
        let Some(category) = self.category(cat) else {
            return Err(EncodeError::UnknownCategory(cat));
        };

        let mut body = Vec::new();
        for record in records {
            body.extend(encode_record(record, category)?);
        }

        let total = 3 + body.len();
        if total > usize::from(u16::MAX) {
            return Err(EncodeError::BlockTooLong(total));
        }

        let mut out = Vec::with_capacity(total);
        out.push(cat);
        out.extend_from_slice(&(total as u16).to_be_bytes());
        out.extend(body);
        Ok(out)
    }
}

fn fail_block(mut block: DecodedBlock, err: DecodeError) -> DecodedBlock {
    block.valid = false;
    block.error = Some(err.to_string());
    block
}

/// Decodes one record from the head of `buf`. On an item-level fault the
/// partial record comes back through the error arm, marked invalid, so
/// the caller can keep it for inspection.
fn decode_record(
    buf: &[u8],
    category: &Category,
) -> Result<(DecodedRecord, usize), (DecodedRecord, DecodeError)> {
    let mut record = DecodedRecord::new();
    record.uap_variant = category.default_uap().to_string();

    let Some((fspec, mut pos)) = Fspec::parse(buf) else {
        let err = DecodeError::FspecTruncated;
        record.valid = false;
        record.error = Some(err.to_string());
        return Err((record, err));
    };

    if let Err(err) = decode_items(buf, &fspec, &mut pos, category, &mut record) {
        record.valid = false;
        record.error = Some(err.to_string());
        return Err((record, err));
    }

    // Mandatory-item validation is deliberately last: the partial
    // decoding stays readable on a miss.
    for item in category.items() {
        if item.presence == Presence::Mandatory && !record.items.contains_key(&item.id) {
            record.valid = false;
            record.error = Some(format!("mandatory item {} not present", item.id));
            break;
        }
    }

    Ok((record, pos))
}

/// Walks the UAP slots, decoding each present item. Decoding starts
/// under the default UAP; once the UAP-case discriminator item has been
/// decoded the active UAP may switch in place for the remaining slots.
/// The FSPEC bitmap itself is never re-read.
fn decode_items(
    buf: &[u8],
    fspec: &Fspec,
    pos: &mut usize,
    category: &Category,
    record: &mut DecodedRecord,
) -> Result<(), DecodeError> {
    let default = category.default_uap();
    let mut slots = category
        .uap(default)
        .ok_or_else(|| DecodeError::UnknownVariant(default.to_string()))?;

    let mut slot = 0;
    while slot < slots.len() {
        slot += 1;
        let id = slots[slot - 1].as_str();

        if id == UNUSED_SLOT || id == RFS_SLOT || !fspec.is_present(slot) {
            continue;
        }

        let item = category
            .item(id)
            .ok_or_else(|| DecodeError::UnknownItem(id.to_string()))?;
        let (value, consumed) = item.decode(&buf[*pos..])?;
        *pos += consumed;
        trace!(item = id, consumed, "decoded item");
        record.insert(value);

        if let Some(case) = category.uap_case() {
            if id == case.item_id {
                let variant = category.resolve_variant(record);
                if variant != record.uap_variant {
                    record.uap_variant = variant.to_string();
                    slots = category
                        .uap(variant)
                        .ok_or_else(|| DecodeError::UnknownVariant(variant.to_string()))?;
                }
            }
        }
    }

    Ok(())
}

/// Encodes one record: FSPEC from the presence vector, then the present
/// items in UAP slot order. Items in the record that have no slot in the
/// selected UAP are ignored.
fn encode_record(record: &DecodedRecord, category: &Category) -> Result<Vec<u8>, EncodeError> {
    let variant = if record.uap_variant.is_empty() {
        category.default_uap()
    } else {
        record.uap_variant.as_str()
    };
    let slots = category
        .uap(variant)
        .ok_or_else(|| EncodeError::UnknownVariant(variant.to_string()))?;

    let present: Vec<bool> = slots
        .iter()
        .map(|id| {
            id != UNUSED_SLOT && id != RFS_SLOT && record.items.contains_key(id.as_str())
        })
        .collect();

    let mut out = Fspec::build(&present);
    for id in slots {
        if id == UNUSED_SLOT || id == RFS_SLOT {
            continue;
        }
        let Some(value) = record.items.get(id.as_str()) else {
            continue;
        };
        let item = category
            .item(id)
            .ok_or_else(|| EncodeError::UnknownItem(id.clone()))?;
        out.extend(item.encode(value)?);
    }
    Ok(out)
}
