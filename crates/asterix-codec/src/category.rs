//! Category schemas: the loader-facing definition and its compiled,
//! validated form.

use std::collections::BTreeMap;

use crate::{
    compiled::CompiledItem,
    decoded::DecodedRecord,
    errors::SchemaError,
    item::ItemSpec,
};

/// UAP slot marking an unused FSPEC position.
pub const UNUSED_SLOT: &str = "-";
/// UAP slot reserved for Random Field Sequencing; never decoded.
pub const RFS_SLOT: &str = "rfs";

/// Picks a UAP variant from one field of an already-decoded item, e.g.
/// CAT01 switches between its plot and track UAPs on I020/TYP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UapCase {
    pub item_id: String,
    pub field: String,
    /// Decoded field value to variant name. Unmapped values fall back
    /// to the default variant.
    pub variants: BTreeMap<u64, String>,
}

/// A category schema as produced by the external spec loader.
#[derive(Debug, Clone, Default)]
pub struct CategorySpec {
    pub cat: u8,
    pub name: String,
    pub edition: String,
    pub date: String,
    pub items: Vec<ItemSpec>,
    /// Variant name to ordered item-id slots. The sentinels
    /// [UNUSED_SLOT] and [RFS_SLOT] are legal slot entries.
    pub uaps: BTreeMap<String, Vec<String>>,
    pub default_uap: String,
    pub uap_case: Option<UapCase>,
}

/// A compiled category, immutable once registered.
#[derive(Debug, Clone)]
pub struct Category {
    pub cat: u8,
    pub name: String,
    pub edition: String,
    pub date: String,
    items: BTreeMap<String, CompiledItem>,
    uaps: BTreeMap<String, Vec<String>>,
    default_uap: String,
    uap_case: Option<UapCase>,
}

impl Category {
    /// Compiles and validates a loader-produced definition: every item
    /// must satisfy the bit-sum rules, every non-sentinel UAP slot must
    /// name a defined item, and the default variant and UAP-case
    /// references must resolve.
    pub fn compile(spec: &CategorySpec) -> Result<Self, SchemaError> {
        let mut items = BTreeMap::new();
        for item in &spec.items {
            let compiled = CompiledItem::try_from(item)?;
            items.insert(compiled.id.clone(), compiled);
        }

        if spec.uaps.is_empty() {
            return Err(SchemaError::NoUapVariants);
        }
        for (variant, slots) in &spec.uaps {
            for id in slots {
                if id == UNUSED_SLOT || id == RFS_SLOT {
                    continue;
                }
                if !items.contains_key(id) {
                    return Err(SchemaError::UnknownUapItem {
                        variant: variant.clone(),
                        id: id.clone(),
                    });
                }
            }
        }
        if !spec.uaps.contains_key(&spec.default_uap) {
            return Err(SchemaError::UnknownDefaultVariant(spec.default_uap.clone()));
        }

        if let Some(case) = &spec.uap_case {
            if !items.contains_key(&case.item_id) {
                return Err(SchemaError::UnknownCaseItem(case.item_id.clone()));
            }
            for (value, variant) in &case.variants {
                if !spec.uaps.contains_key(variant) {
                    return Err(SchemaError::UnknownCaseVariant {
                        value: *value,
                        variant: variant.clone(),
                    });
                }
            }
        }

        Ok(Category {
            cat: spec.cat,
            name: spec.name.clone(),
            edition: spec.edition.clone(),
            date: spec.date.clone(),
            items,
            uaps: spec.uaps.clone(),
            default_uap: spec.default_uap.clone(),
            uap_case: spec.uap_case.clone(),
        })
    }

    pub fn item(&self, id: &str) -> Option<&CompiledItem> {
        self.items.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &CompiledItem> {
        self.items.values()
    }

    pub fn uap(&self, variant: &str) -> Option<&[String]> {
        self.uaps.get(variant).map(|slots| slots.as_slice())
    }

    pub fn default_uap(&self) -> &str {
        &self.default_uap
    }

    pub fn uap_case(&self) -> Option<&UapCase> {
        self.uap_case.as_ref()
    }

    /// Resolves the UAP variant for a (possibly partially) decoded
    /// record. The case discriminator applies only when the item, the
    /// field, and the value mapping all line up; anything else falls
    /// back to the default variant.
    pub fn resolve_variant(&self, record: &DecodedRecord) -> &str {
        let Some(case) = &self.uap_case else {
            return &self.default_uap;
        };
        let Some(item) = record.items.get(&case.item_id) else {
            return &self.default_uap;
        };
        let Some(value) = item.fields.get(&case.field) else {
            return &self.default_uap;
        };
        match case.variants.get(value) {
            Some(variant) => variant,
            None => &self.default_uap,
        }
    }
}
