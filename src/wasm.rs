//! WASM bindings for the web app.

use wasm_bindgen::prelude::*;

use crate::attributes::AttributeKind;
use crate::catalog::{collection_stats, Catalog, CollectionStats};
use crate::history::Combination;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);
}

/// Initialize panic hook for better error messages.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen(js_name = getCoreVersion)]
pub fn get_core_version_js() -> String {
    crate::get_core_version().to_string()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Picker
// ═══════════════════════════════════════════════════════════════════════════════

/// Pick a random combination.
///
/// Takes `{catalog, combinations, filters}` as a JSON string and returns a
/// JSON `{candidate, previouslyUsed}`.
#[wasm_bindgen(js_name = pickJson)]
pub fn pick_json_js(input_json: &str) -> Result<String, JsValue> {
    crate::selector::pick_json(input_json).map_err(|e| JsValue::from_str(&e.to_string()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Collection and history views
// ═══════════════════════════════════════════════════════════════════════════════

/// Collection statistics.
///
/// Takes a JsValue catalog and a JsValue combination list, returns a
/// JsValue (CollectionStats).
#[wasm_bindgen(js_name = collectionStats)]
pub fn collection_stats_js(catalog: JsValue, combinations: JsValue) -> Result<JsValue, JsValue> {
    let catalog: Catalog = serde_wasm_bindgen::from_value(catalog)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse catalog: {}", e)))?;
    let combinations: Vec<Combination> = serde_wasm_bindgen::from_value(combinations)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse combinations: {}", e)))?;

    let stats: CollectionStats = collection_stats(&catalog, &combinations);

    serde_wasm_bindgen::to_value(&stats)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize output: {}", e)))
}

/// Collection statistics using JSON strings (alternative API).
#[wasm_bindgen(js_name = collectionStatsJson)]
pub fn collection_stats_json_js(input_json: &str) -> Result<String, JsValue> {
    crate::catalog::collection_stats_json(input_json).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Filter and sort history for display.
///
/// Takes `{combinations, query}` as a JSON string.
#[wasm_bindgen(js_name = queryHistoryJson)]
pub fn query_history_json_js(input_json: &str) -> Result<String, JsValue> {
    crate::history::query_history_json(input_json).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Effective option list for an attribute kind.
///
/// Takes `{kind, registry, catalog}` as a JSON string.
#[wasm_bindgen(js_name = attributeValuesJson)]
pub fn attribute_values_json_js(input_json: &str) -> Result<String, JsValue> {
    crate::attributes::attribute_values_json(input_json).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Built-in values for an attribute kind (`color`, `formula`, `topperType`, ...).
#[wasm_bindgen(js_name = builtinAttributeValues)]
pub fn builtin_attribute_values_js(kind: &str) -> Result<Vec<String>, JsValue> {
    let kind: AttributeKind = kind.parse().map_err(|e: crate::error::PickerError| JsValue::from_str(&e.to_string()))?;
    Ok(kind.builtins().iter().map(|s| s.to_string()).collect())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Import
// ═══════════════════════════════════════════════════════════════════════════════

/// Check an import file without applying it.
#[wasm_bindgen(js_name = validateImportJson)]
pub fn validate_import_json_js(input_json: &str) -> Result<String, JsValue> {
    crate::persistence::validate_import_json(input_json).map_err(|e| JsValue::from_str(&e.to_string()))
}
