use std::collections::BTreeMap;

use asterix_codec::decoded::{DecodedBlock, DecodedItem, DecodedRecord, ItemFormat};
use serde::Serialize;
use wasm_bindgen::JsValue;

#[derive(Serialize)]
struct BlockOut {
    cat: u8,
    length: u16,
    valid: bool,
    error: Option<String>,
    records: Vec<RecordOut>,
}

#[derive(Serialize)]
struct RecordOut {
    uap_variant: String,
    valid: bool,
    error: Option<String>,
    items: BTreeMap<String, ItemOut>,
}

#[derive(Serialize)]
struct ItemOut {
    format: &'static str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    repetitions: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    group_repetitions: Vec<BTreeMap<String, u64>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    raw_bytes: Vec<u8>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    compound_sub_fields: BTreeMap<String, BTreeMap<String, u64>>,
}

fn format_name(format: ItemFormat) -> &'static str {
    match format {
        ItemFormat::Fixed => "fixed",
        ItemFormat::Extended => "extended",
        ItemFormat::Repetitive => "repetitive",
        ItemFormat::RepetitiveGroup => "repetitive_group",
        ItemFormat::RepetitiveGroupFx => "repetitive_group_fx",
        ItemFormat::Explicit => "explicit",
        ItemFormat::Compound => "compound",
    }
}

fn item_out(item: DecodedItem) -> ItemOut {
    ItemOut {
        format: format_name(item.format),
        fields: item.fields,
        repetitions: item.repetitions,
        group_repetitions: item.group_repetitions,
        raw_bytes: item.raw_bytes,
        compound_sub_fields: item.compound_sub_fields,
    }
}

fn record_out(record: DecodedRecord) -> RecordOut {
    RecordOut {
        uap_variant: record.uap_variant,
        valid: record.valid,
        error: record.error,
        items: record
            .items
            .into_iter()
            .map(|(id, item)| (id, item_out(item)))
            .collect(),
    }
}

pub fn block_to_js(block: DecodedBlock) -> Result<JsValue, JsValue> {
    let out = BlockOut {
        cat: block.cat,
        length: block.length,
        valid: block.valid,
        error: block.error,
        records: block.records.into_iter().map(record_out).collect(),
    };
    serde_wasm_bindgen::to_value(&out).map_err(|e| JsValue::from_str(&e.to_string()))
}
