//! Compiled Data Items: definitions validated against the bit-sum rules,
//! with derived wire sizes and one decode/encode pair per item kind.

use std::collections::BTreeMap;

use crate::{
    bits::{BitReader, BitWriter},
    category::UNUSED_SLOT,
    decoded::{DecodedItem, ItemFormat},
    element::ElementSpec,
    errors::{DecodeError, EncodeError, SchemaError},
    fspec::{Fspec, FX},
    item::{ItemKind, ItemSpec, OctetSpec, Presence},
};

/// A Compound sub-item with its derived byte length. Unused (`"-"`)
/// slots keep an empty template and a zero length.
#[derive(Debug, Clone)]
pub struct CompiledSubItem {
    pub name: String,
    pub elements: Vec<ElementSpec>,
    pub fixed_bytes: usize,
}

/// Kind-specific template with derived sizes.
#[derive(Debug, Clone)]
pub enum CompiledKind {
    Fixed {
        elements: Vec<ElementSpec>,
        fixed_bytes: usize,
    },
    Extended {
        octets: Vec<OctetSpec>,
    },
    Repetitive {
        element: ElementSpec,
    },
    RepetitiveGroup {
        elements: Vec<ElementSpec>,
        group_bytes: usize,
    },
    RepetitiveGroupFx {
        elements: Vec<ElementSpec>,
        group_bytes: usize,
    },
    Explicit,
    Compound {
        sub_items: Vec<CompiledSubItem>,
    },
}

/// A validated Data Item definition ready for the wire.
#[derive(Debug, Clone)]
pub struct CompiledItem {
    pub id: String,
    pub name: String,
    pub presence: Presence,
    pub kind: CompiledKind,
}

impl TryFrom<&ItemSpec> for CompiledItem {
    type Error = SchemaError;

    fn try_from(spec: &ItemSpec) -> Result<Self, SchemaError> {
        let kind = match &spec.kind {
            ItemKind::Fixed { elements } => {
                let bits = element_bit_sum(&spec.id, elements)?;
                if bits % 8 != 0 {
                    return Err(SchemaError::FixedBitSum {
                        item: spec.id.clone(),
                        bits,
                    });
                }
                CompiledKind::Fixed {
                    elements: elements.clone(),
                    fixed_bytes: bits / 8,
                }
            }
            ItemKind::Extended { octets } => {
                if octets.is_empty() {
                    return Err(SchemaError::EmptyItem {
                        item: spec.id.clone(),
                    });
                }
                for (i, octet) in octets.iter().enumerate() {
                    let bits = element_bit_sum(&spec.id, &octet.elements)?;
                    if bits != 7 {
                        return Err(SchemaError::OctetBitSum {
                            item: spec.id.clone(),
                            octet: i,
                            bits,
                        });
                    }
                }
                CompiledKind::Extended {
                    octets: octets.clone(),
                }
            }
            ItemKind::Repetitive { element } => {
                if element.bits != 7 {
                    return Err(SchemaError::RepetitiveWidth {
                        item: spec.id.clone(),
                        bits: element.bits,
                    });
                }
                CompiledKind::Repetitive {
                    element: element.clone(),
                }
            }
            ItemKind::RepetitiveGroup { elements } => {
                let bits = element_bit_sum(&spec.id, elements)?;
                if bits % 8 != 0 {
                    return Err(SchemaError::GroupBitSum {
                        item: spec.id.clone(),
                        bits,
                    });
                }
                CompiledKind::RepetitiveGroup {
                    elements: elements.clone(),
                    group_bytes: bits / 8,
                }
            }
            ItemKind::RepetitiveGroupFx { elements } => {
                let bits = element_bit_sum(&spec.id, elements)?;
                if (bits + 1) % 8 != 0 {
                    return Err(SchemaError::GroupFxBitSum {
                        item: spec.id.clone(),
                        bits: bits + 1,
                    });
                }
                CompiledKind::RepetitiveGroupFx {
                    elements: elements.clone(),
                    group_bytes: (bits + 1) / 8,
                }
            }
            ItemKind::Explicit => CompiledKind::Explicit,
            ItemKind::Compound { sub_items } => {
                if sub_items.is_empty() {
                    return Err(SchemaError::EmptyItem {
                        item: spec.id.clone(),
                    });
                }
                let mut compiled = Vec::with_capacity(sub_items.len());
                for sub in sub_items {
                    if sub.name == UNUSED_SLOT {
                        compiled.push(CompiledSubItem {
                            name: sub.name.clone(),
                            elements: Vec::new(),
                            fixed_bytes: 0,
                        });
                        continue;
                    }
                    let bits = element_bit_sum(&spec.id, &sub.elements)?;
                    if bits % 8 != 0 {
                        return Err(SchemaError::SubItemBitSum {
                            item: spec.id.clone(),
                            sub: sub.name.clone(),
                            bits,
                        });
                    }
                    compiled.push(CompiledSubItem {
                        name: sub.name.clone(),
                        elements: sub.elements.clone(),
                        fixed_bytes: bits / 8,
                    });
                }
                CompiledKind::Compound {
                    sub_items: compiled,
                }
            }
        };

        Ok(CompiledItem {
            id: spec.id.clone(),
            name: spec.name.clone(),
            presence: spec.presence,
            kind,
        })
    }
}

impl CompiledItem {
    pub fn format(&self) -> ItemFormat {
        match self.kind {
            CompiledKind::Fixed { .. } => ItemFormat::Fixed,
            CompiledKind::Extended { .. } => ItemFormat::Extended,
            CompiledKind::Repetitive { .. } => ItemFormat::Repetitive,
            CompiledKind::RepetitiveGroup { .. } => ItemFormat::RepetitiveGroup,
            CompiledKind::RepetitiveGroupFx { .. } => ItemFormat::RepetitiveGroupFx,
            CompiledKind::Explicit => ItemFormat::Explicit,
            CompiledKind::Compound { .. } => ItemFormat::Compound,
        }
    }

    /// Decodes one item from the head of `buf`, returning the value and
    /// the number of bytes consumed.
    pub fn decode(&self, buf: &[u8]) -> Result<(DecodedItem, usize), DecodeError> {
        let mut out = DecodedItem::new(&self.id, self.format());
        let consumed = match &self.kind {
            CompiledKind::Fixed {
                elements,
                fixed_bytes,
            } => {
                if buf.len() < *fixed_bytes {
                    return Err(DecodeError::ItemTooShort {
                        id: self.id.clone(),
                        needed: *fixed_bytes,
                        available: buf.len(),
                    });
                }
                let mut reader = BitReader::new(&buf[..*fixed_bytes]);
                decode_elements(&self.id, elements, &mut reader, &mut out.fields)?;
                *fixed_bytes
            }

            CompiledKind::Extended { octets } => {
                let mut offset = 0;
                loop {
                    let Some(&raw) = buf.get(offset) else {
                        return Err(DecodeError::FxTruncated {
                            id: self.id.clone(),
                        });
                    };
                    // Octets past the declared templates are consumed
                    // but not decoded: some radars send more than the
                    // edition of the spec they claim to follow.
                    if let Some(octet) = octets.get(offset) {
                        let byte = [raw];
                        let mut reader = BitReader::new(&byte);
                        decode_elements(&self.id, &octet.elements, &mut reader, &mut out.fields)?;
                    }
                    offset += 1;
                    if raw & FX == 0 {
                        break;
                    }
                }
                offset
            }

            CompiledKind::Repetitive { .. } => {
                let mut offset = 0;
                loop {
                    let Some(&raw) = buf.get(offset) else {
                        return Err(DecodeError::FxTruncated {
                            id: self.id.clone(),
                        });
                    };
                    offset += 1;
                    out.repetitions.push(u64::from(raw >> 1));
                    if raw & FX == 0 {
                        break;
                    }
                }
                offset
            }

            CompiledKind::RepetitiveGroup {
                elements,
                group_bytes,
            } => {
                let Some(&count) = buf.first() else {
                    return Err(DecodeError::ItemTooShort {
                        id: self.id.clone(),
                        needed: 1,
                        available: 0,
                    });
                };
                let needed = 1 + usize::from(count) * group_bytes;
                if buf.len() < needed {
                    return Err(DecodeError::ItemTooShort {
                        id: self.id.clone(),
                        needed,
                        available: buf.len(),
                    });
                }
                let mut offset = 1;
                for _ in 0..count {
                    let mut reader = BitReader::new(&buf[offset..offset + group_bytes]);
                    let mut group = BTreeMap::new();
                    decode_elements(&self.id, elements, &mut reader, &mut group)?;
                    out.group_repetitions.push(group);
                    offset += group_bytes;
                }
                needed
            }

            CompiledKind::RepetitiveGroupFx {
                elements,
                group_bytes,
            } => {
                let mut offset = 0;
                loop {
                    if buf.len() < offset + group_bytes {
                        return Err(DecodeError::FxTruncated {
                            id: self.id.clone(),
                        });
                    }
                    let mut reader = BitReader::new(&buf[offset..offset + group_bytes]);
                    let mut group = BTreeMap::new();
                    decode_elements(&self.id, elements, &mut reader, &mut group)?;
                    let fx = reader.read_bit().map_err(|source| DecodeError::Bits {
                        id: self.id.clone(),
                        source,
                    })?;
                    out.group_repetitions.push(group);
                    offset += group_bytes;
                    if !fx {
                        break;
                    }
                }
                offset
            }

            CompiledKind::Explicit => {
                let Some(&len) = buf.first() else {
                    return Err(DecodeError::ItemTooShort {
                        id: self.id.clone(),
                        needed: 1,
                        available: 0,
                    });
                };
                if len == 0 {
                    return Err(DecodeError::ExplicitLengthZero {
                        id: self.id.clone(),
                    });
                }
                // The length byte counts itself: L bytes on the wire,
                // L-1 of payload.
                if buf.len() < usize::from(len) {
                    return Err(DecodeError::ExplicitTooLong {
                        id: self.id.clone(),
                        len,
                        available: buf.len(),
                    });
                }
                out.raw_bytes = buf[1..usize::from(len)].to_vec();
                usize::from(len)
            }

            CompiledKind::Compound { sub_items } => {
                let Some((psf, mut offset)) = Fspec::parse(buf) else {
                    return Err(DecodeError::FxTruncated {
                        id: self.id.clone(),
                    });
                };
                // A set bit past the declared sub-items would leave the
                // payload length unknowable.
                for slot in sub_items.len() + 1..=psf.bytes().len() * 7 {
                    if psf.is_present(slot) {
                        return Err(DecodeError::UnknownSubItemSlot {
                            id: self.id.clone(),
                            slot,
                        });
                    }
                }
                for (i, sub) in sub_items.iter().enumerate() {
                    if !psf.is_present(i + 1) || sub.name == UNUSED_SLOT {
                        continue;
                    }
                    if buf.len() < offset + sub.fixed_bytes {
                        return Err(DecodeError::ItemTooShort {
                            id: self.id.clone(),
                            needed: offset + sub.fixed_bytes,
                            available: buf.len(),
                        });
                    }
                    let mut reader = BitReader::new(&buf[offset..offset + sub.fixed_bytes]);
                    let mut fields = BTreeMap::new();
                    decode_elements(&self.id, &sub.elements, &mut reader, &mut fields)?;
                    out.compound_sub_fields.insert(sub.name.clone(), fields);
                    offset += sub.fixed_bytes;
                }
                offset
            }
        };

        Ok((out, consumed))
    }

    /// Serializes `value` to the item's wire bytes.
    pub fn encode(&self, value: &DecodedItem) -> Result<Vec<u8>, EncodeError> {
        let mut writer = BitWriter::new();
        match &self.kind {
            CompiledKind::Fixed { elements, .. } => {
                encode_elements(elements, &value.fields, &mut writer)?;
            }

            CompiledKind::Extended { octets } => {
                // Emit up to the highest octet carrying a non-zero
                // non-spare value; at least one octet always goes out.
                let mut last = 0;
                for (i, octet) in octets.iter().enumerate() {
                    let in_use = octet.elements.iter().any(|e| {
                        !e.is_spare && value.fields.get(&e.name).copied().unwrap_or(0) != 0
                    });
                    if in_use {
                        last = i;
                    }
                }
                for (i, octet) in octets.iter().take(last + 1).enumerate() {
                    encode_elements(&octet.elements, &value.fields, &mut writer)?;
                    writer.write_bit(i != last);
                }
            }

            CompiledKind::Repetitive { .. } => {
                if value.repetitions.is_empty() {
                    writer.write_byte(0);
                } else {
                    let n = value.repetitions.len();
                    for (i, &rep) in value.repetitions.iter().enumerate() {
                        writer.write_bits(rep, 7)?;
                        writer.write_bit(i + 1 != n);
                    }
                }
            }

            CompiledKind::RepetitiveGroup { elements, .. } => {
                let count = value.group_repetitions.len();
                if count > 255 {
                    return Err(EncodeError::TooManyGroups {
                        item: self.id.clone(),
                        count,
                    });
                }
                writer.write_byte(count as u8);
                for group in &value.group_repetitions {
                    encode_elements(elements, group, &mut writer)?;
                }
            }

            CompiledKind::RepetitiveGroupFx { elements, .. } => {
                if value.group_repetitions.is_empty() {
                    let empty = BTreeMap::new();
                    encode_elements(elements, &empty, &mut writer)?;
                    writer.write_bit(false);
                } else {
                    let n = value.group_repetitions.len();
                    for (i, group) in value.group_repetitions.iter().enumerate() {
                        encode_elements(elements, group, &mut writer)?;
                        writer.write_bit(i + 1 != n);
                    }
                }
            }

            CompiledKind::Explicit => {
                if value.raw_bytes.len() + 1 > 255 {
                    return Err(EncodeError::PayloadTooLong {
                        item: self.id.clone(),
                        len: value.raw_bytes.len(),
                    });
                }
                writer.write_byte((value.raw_bytes.len() + 1) as u8);
                writer.write_bytes(&value.raw_bytes);
            }

            CompiledKind::Compound { sub_items } => {
                for sub_name in value.compound_sub_fields.keys() {
                    if !sub_items.iter().any(|s| s.name == *sub_name) {
                        return Err(EncodeError::UnknownSubItem {
                            item: self.id.clone(),
                            sub: sub_name.clone(),
                        });
                    }
                }
                let present: Vec<bool> = sub_items
                    .iter()
                    .map(|s| {
                        s.name != UNUSED_SLOT && value.compound_sub_fields.contains_key(&s.name)
                    })
                    .collect();
                writer.write_bytes(&Fspec::build(&present));
                for sub in sub_items {
                    if sub.name == UNUSED_SLOT {
                        continue;
                    }
                    let Some(fields) = value.compound_sub_fields.get(&sub.name) else {
                        continue;
                    };
                    encode_elements(&sub.elements, fields, &mut writer)?;
                }
            }
        }
        Ok(writer.take())
    }
}

fn element_bit_sum(item: &str, elements: &[ElementSpec]) -> Result<usize, SchemaError> {
    if elements.is_empty() {
        return Err(SchemaError::EmptyItem {
            item: item.to_string(),
        });
    }
    let mut total = 0;
    for e in elements {
        if e.bits == 0 || e.bits > 64 {
            return Err(SchemaError::ElementWidth {
                item: item.to_string(),
                element: e.name.clone(),
                bits: e.bits,
            });
        }
        total += usize::from(e.bits);
    }
    Ok(total)
}

fn decode_elements(
    id: &str,
    elements: &[ElementSpec],
    reader: &mut BitReader<'_>,
    out: &mut BTreeMap<String, u64>,
) -> Result<(), DecodeError> {
    for e in elements {
        if e.is_spare {
            reader
                .skip(usize::from(e.bits))
                .map_err(|source| DecodeError::Bits {
                    id: id.to_string(),
                    source,
                })?;
            continue;
        }
        let raw = reader
            .read_bits(usize::from(e.bits))
            .map_err(|source| DecodeError::Bits {
                id: id.to_string(),
                source,
            })?;
        out.insert(e.name.clone(), raw);
    }
    Ok(())
}

fn encode_elements(
    elements: &[ElementSpec],
    fields: &BTreeMap<String, u64>,
    writer: &mut BitWriter,
) -> Result<(), EncodeError> {
    for e in elements {
        let raw = if e.is_spare {
            0
        } else {
            fields.get(&e.name).copied().unwrap_or(0)
        };
        writer.write_bits(raw, usize::from(e.bits))?;
    }
    Ok(())
}
