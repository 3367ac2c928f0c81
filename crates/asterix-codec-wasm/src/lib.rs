use asterix_codec::category::Category;
use asterix_codec::codec::Codec;
use asterix_codec::serde::CategoryDef;
use wasm_bindgen::prelude::*;

mod convert;

/// ASTERIX codec handle for JavaScript callers.
#[wasm_bindgen]
#[derive(Default)]
pub struct WasmCodec {
    inner: Codec,
}

#[wasm_bindgen]
impl WasmCodec {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmCodec {
        WasmCodec {
            inner: Codec::new(),
        }
    }

    /// Registers a category from its JSON schema definition. The shape
    /// is [asterix_codec::serde::CategoryDef].
    pub fn register_category(&mut self, schema_json: &str) -> Result<(), JsValue> {
        let def: CategoryDef =
            serde_json::from_str(schema_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let category = Category::try_from(def).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.inner.register_category(category);
        Ok(())
    }

    /// Decodes a data block into a plain JS object. Malformed input
    /// yields `valid: false` and an error string, never an exception.
    pub fn decode(&self, data: &[u8]) -> Result<JsValue, JsValue> {
        convert::block_to_js(self.inner.decode(data))
    }
}
