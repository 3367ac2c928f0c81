//! Data Item definitions: the schema layer an external spec loader
//! produces and [Category](crate::category::Category) compiles.

use crate::element::ElementSpec;

/// Presence rule for an item within its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Mandatory,
    Conditional,
    Optional,
}

/// One data octet of an Extended item: elements summing to seven bits.
/// The eighth wire bit is the FX continuation flag and is never listed.
#[derive(Debug, Clone, PartialEq)]
pub struct OctetSpec {
    pub elements: Vec<ElementSpec>,
}

/// One PSF slot of a Compound item. The name `"-"` marks a slot the
/// standard reserves but never fills.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSubItemSpec {
    pub name: String,
    pub elements: Vec<ElementSpec>,
}

/// Wire format of a Data Item, with its kind-specific template.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// Fixed byte length; elements bit-packed in declared order.
    Fixed { elements: Vec<ElementSpec> },
    /// FX-chained octets of seven data bits each.
    Extended { octets: Vec<OctetSpec> },
    /// FX-chained octets of one 7-bit value each.
    Repetitive { element: ElementSpec },
    /// One count byte, then `count` copies of the group template.
    RepetitiveGroup { elements: Vec<ElementSpec> },
    /// Whole-byte groups chained by a trailing FX bit.
    RepetitiveGroupFx { elements: Vec<ElementSpec> },
    /// One length byte (inclusive of itself), then opaque payload.
    Explicit,
    /// PSF-addressed optional sub-items in declared slot order.
    Compound { sub_items: Vec<CompoundSubItemSpec> },
}

/// Definition of one Data Item as the schema loader hands it over.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpec {
    /// Item identifier within the category, e.g. "010" or "SP".
    pub id: String,
    /// Title from the specification document.
    pub name: String,
    pub presence: Presence,
    pub kind: ItemKind,
}

impl ItemSpec {
    pub fn new(id: &str, name: &str, presence: Presence, kind: ItemKind) -> Self {
        ItemSpec {
            id: id.to_string(),
            name: name.to_string(),
            presence,
            kind,
        }
    }

    pub fn fixed(id: &str, name: &str, presence: Presence, elements: Vec<ElementSpec>) -> Self {
        Self::new(id, name, presence, ItemKind::Fixed { elements })
    }

    pub fn extended(id: &str, name: &str, presence: Presence, octets: Vec<Vec<ElementSpec>>) -> Self {
        let octets = octets
            .into_iter()
            .map(|elements| OctetSpec { elements })
            .collect();
        Self::new(id, name, presence, ItemKind::Extended { octets })
    }

    pub fn repetitive(id: &str, name: &str, presence: Presence, element: ElementSpec) -> Self {
        Self::new(id, name, presence, ItemKind::Repetitive { element })
    }

    pub fn repetitive_group(
        id: &str,
        name: &str,
        presence: Presence,
        elements: Vec<ElementSpec>,
    ) -> Self {
        Self::new(id, name, presence, ItemKind::RepetitiveGroup { elements })
    }

    pub fn repetitive_group_fx(
        id: &str,
        name: &str,
        presence: Presence,
        elements: Vec<ElementSpec>,
    ) -> Self {
        Self::new(id, name, presence, ItemKind::RepetitiveGroupFx { elements })
    }

    pub fn explicit(id: &str, name: &str, presence: Presence) -> Self {
        Self::new(id, name, presence, ItemKind::Explicit)
    }

    pub fn compound(
        id: &str,
        name: &str,
        presence: Presence,
        sub_items: Vec<(&str, Vec<ElementSpec>)>,
    ) -> Self {
        let sub_items = sub_items
            .into_iter()
            .map(|(name, elements)| CompoundSubItemSpec {
                name: name.to_string(),
                elements,
            })
            .collect();
        Self::new(id, name, presence, ItemKind::Compound { sub_items })
    }
}
