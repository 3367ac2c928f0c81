//! JSON-deserializable category definitions.
//!
//! These types mirror the schema layer one-to-one and exist so an
//! external spec loader (XML in the reference tooling, JSON here) has a
//! stable target shape: deserialize a [CategoryDef], then compile it
//! straight into a runtime [Category](crate::category::Category) with
//! `TryFrom`.
//!
//! Unknown `kind` tags fail deserialization: the set of item kinds is
//! closed, and a schema the codec cannot honor is rejected before it
//! ever reaches the wire path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    category::{Category, CategorySpec, UapCase},
    element::{ElementSpec, Encoding},
    errors::SchemaError,
    item::{CompoundSubItemSpec, ItemKind, ItemSpec, OctetSpec, Presence},
};

/// Interpretation hint for an element's raw bits.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub enum EncodingDef {
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

/// A leaf field. Spares carry `"spare": true` and need no name.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ElementDef {
    /// Field name; becomes the key in decoded field maps.
    #[serde(default)]
    pub name: String,
    /// Width on the wire, 1-64 bits.
    pub bits: u16,
    #[serde(default)]
    pub encoding: EncodingDef,
    /// Whether this element only occupies width (decoded as a skip,
    /// encoded as zeros).
    #[serde(default)]
    pub spare: bool,
    /// LSB scale for quantity encodings.
    #[serde(default)]
    pub scale: Option<f64>,
    /// Physical unit for quantity encodings.
    #[serde(default)]
    pub unit: Option<String>,
    /// Raw value to meaning, for table encodings.
    #[serde(default)]
    pub table: BTreeMap<u64, String>,
    /// Informational operational minimum.
    #[serde(default)]
    pub min: Option<f64>,
    /// Informational operational maximum.
    #[serde(default)]
    pub max: Option<f64>,
}

/// Presence rule for an item within its category.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub enum PresenceDef {
    Mandatory,
    Conditional,
    Optional,
}

/// One data octet of an Extended item; elements must sum to seven bits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OctetDef {
    pub elements: Vec<ElementDef>,
}

/// One PSF slot of a Compound item; the name `"-"` marks an unused slot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompoundSubItemDef {
    pub name: String,
    #[serde(default)]
    pub elements: Vec<ElementDef>,
}

/// Wire format of a Data Item.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ItemKindDef {
    /// Fixed byte length; elements bit-packed in declared order.
    Fixed { elements: Vec<ElementDef> },
    /// FX-chained octets of seven data bits each.
    Extended { octets: Vec<OctetDef> },
    /// FX-chained octets of one 7-bit value each.
    Repetitive { element: ElementDef },
    /// One count byte, then `count` copies of the group template.
    RepetitiveGroup { elements: Vec<ElementDef> },
    /// Whole-byte groups chained by a trailing FX bit.
    RepetitiveGroupFx { elements: Vec<ElementDef> },
    /// One length byte (inclusive of itself), then opaque payload.
    Explicit,
    /// PSF-addressed optional sub-items in declared slot order.
    Compound { sub_items: Vec<CompoundSubItemDef> },
}

/// Definition of one Data Item.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItemDef {
    /// Item identifier within the category, e.g. `"010"` or `"SP"`.
    pub id: String,
    /// Title from the specification document.
    #[serde(default)]
    pub name: String,
    pub presence: PresenceDef,
    pub kind: ItemKindDef,
}

/// UAP variant discriminator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UapCaseDef {
    /// Item whose decoded value selects the variant.
    pub item: String,
    /// Field of that item to inspect.
    pub field: String,
    /// Decoded value to variant name.
    pub variants: BTreeMap<u64, String>,
}

/// Top-level category definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryDef {
    pub cat: u8,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub edition: String,
    #[serde(default)]
    pub date: String,
    pub items: Vec<ItemDef>,
    /// Variant name to ordered item-id slots; `"-"` and `"rfs"` are
    /// legal slot entries.
    pub uaps: BTreeMap<String, Vec<String>>,
    pub default_uap: String,
    #[serde(default)]
    pub uap_case: Option<UapCaseDef>,
}

impl From<EncodingDef> for Encoding {
    fn from(def: EncodingDef) -> Self {
        match def {
            EncodingDef::Raw => Encoding::Raw,
            EncodingDef::Table => Encoding::Table,
            EncodingDef::UnsignedQuantity => Encoding::UnsignedQuantity,
            EncodingDef::SignedQuantity => Encoding::SignedQuantity,
            EncodingDef::StringOctal => Encoding::StringOctal,
        }
    }
}

impl From<ElementDef> for ElementSpec {
    fn from(def: ElementDef) -> Self {
        let range = match (def.min, def.max) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        };
        ElementSpec {
            name: def.name,
            bits: def.bits,
            encoding: def.encoding.into(),
            is_spare: def.spare,
            scale: def.scale.unwrap_or(1.0),
            unit: def.unit.unwrap_or_default(),
            table: def.table,
            range,
        }
    }
}

impl From<PresenceDef> for Presence {
    fn from(def: PresenceDef) -> Self {
        match def {
            PresenceDef::Mandatory => Presence::Mandatory,
            PresenceDef::Conditional => Presence::Conditional,
            PresenceDef::Optional => Presence::Optional,
        }
    }
}

fn elements(defs: Vec<ElementDef>) -> Vec<ElementSpec> {
    defs.into_iter().map(Into::into).collect()
}

impl From<ItemKindDef> for ItemKind {
    fn from(def: ItemKindDef) -> Self {
        match def {
            ItemKindDef::Fixed { elements: e } => ItemKind::Fixed { elements: elements(e) },
            ItemKindDef::Extended { octets } => ItemKind::Extended {
                octets: octets
                    .into_iter()
                    .map(|o| OctetSpec {
                        elements: elements(o.elements),
                    })
                    .collect(),
            },
            ItemKindDef::Repetitive { element } => ItemKind::Repetitive {
                element: element.into(),
            },
            ItemKindDef::RepetitiveGroup { elements: e } => ItemKind::RepetitiveGroup {
                elements: elements(e),
            },
            ItemKindDef::RepetitiveGroupFx { elements: e } => ItemKind::RepetitiveGroupFx {
                elements: elements(e),
            },
            ItemKindDef::Explicit => ItemKind::Explicit,
            ItemKindDef::Compound { sub_items } => ItemKind::Compound {
                sub_items: sub_items
                    .into_iter()
                    .map(|s| CompoundSubItemSpec {
                        name: s.name,
                        elements: elements(s.elements),
                    })
                    .collect(),
            },
        }
    }
}

impl From<ItemDef> for ItemSpec {
    fn from(def: ItemDef) -> Self {
        ItemSpec {
            id: def.id,
            name: def.name,
            presence: def.presence.into(),
            kind: def.kind.into(),
        }
    }
}

impl From<UapCaseDef> for UapCase {
    fn from(def: UapCaseDef) -> Self {
        UapCase {
            item_id: def.item,
            field: def.field,
            variants: def.variants,
        }
    }
}

impl From<CategoryDef> for CategorySpec {
    fn from(def: CategoryDef) -> Self {
        CategorySpec {
            cat: def.cat,
            name: def.name,
            edition: def.edition,
            date: def.date,
            items: def.items.into_iter().map(Into::into).collect(),
            uaps: def.uaps,
            default_uap: def.default_uap,
            uap_case: def.uap_case.map(Into::into),
        }
    }
}

impl TryFrom<CategoryDef> for Category {
    type Error = SchemaError;

    fn try_from(def: CategoryDef) -> Result<Self, SchemaError> {
        let spec = CategorySpec::from(def);
        Category::compile(&spec)
    }
}
