//! Leaf field definitions inside a Data Item.

use std::collections::BTreeMap;

/// How consumers should interpret an element's raw bits.
///
/// The codec itself only ever moves raw unsigned integers; these tags
/// and the informational attributes on [ElementSpec] travel with the
/// schema so display layers can apply scale, unit, and lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// An opaque unsigned integer.
    #[default]
    Raw,
    /// Raw value looked up in the element's table.
    Table,
    /// Physical value = scale x raw.
    UnsignedQuantity,
    /// Physical value = scale x twos_complement(raw).
    SignedQuantity,
    /// Octal digit groups, e.g. a 12-bit Mode-3/A squawk.
    StringOctal,
}

/// A single named field inside a Data Item template.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSpec {
    /// Field name, e.g. "SAC". Empty for spares.
    pub name: String,
    /// Width on the wire, 1-64 bits.
    pub bits: u16,
    pub encoding: Encoding,
    /// Spares occupy width but produce no decoded value and write zeros.
    pub is_spare: bool,
    /// LSB scale for quantity encodings, e.g. 1/128 s.
    pub scale: f64,
    /// Physical unit for quantity encodings.
    pub unit: String,
    /// Raw value to meaning, for table encodings.
    pub table: BTreeMap<u64, String>,
    /// Informational operational range, if the document declares one.
    pub range: Option<(f64, f64)>,
}

impl ElementSpec {
    /// A raw unsigned field.
    pub fn new(name: &str, bits: u16) -> Self {
        ElementSpec {
            name: name.to_string(),
            bits,
            ..Default::default()
        }
    }

    /// A spare block of `bits` zero bits.
    pub fn spare(bits: u16) -> Self {
        ElementSpec {
            bits,
            is_spare: true,
            ..Default::default()
        }
    }
}

impl Default for ElementSpec {
    fn default() -> Self {
        ElementSpec {
            name: String::new(),
            bits: 0,
            encoding: Encoding::Raw,
            is_spare: false,
            scale: 1.0,
            unit: String::new(),
            table: BTreeMap::new(),
            range: None,
        }
    }
}
