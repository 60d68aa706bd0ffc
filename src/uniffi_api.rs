//! UniFFI API module for Swift and Kotlin bindings.
//!
//! This module exposes the stateless picker operations via UniFFI for mobile platforms.
//! All functions use JSON strings for input/output to simplify cross-language marshalling.

use chrono::{TimeZone, Utc};

use crate::attributes::AttributeKind;
use crate::catalog::TokenCount;
use crate::error::PickerError;

/// Get the version of the polish-picker-core library.
#[uniffi::export]
pub fn get_core_version() -> String {
    crate::get_core_version().to_string()
}

/// Pick a random combination.
///
/// # Arguments
/// * `input_json` - JSON string with format:
///   ```json
///   {
///     "catalog": {"polishes": [...], "toppers": [...], "finishers": [...]},
///     "combinations": [...],
///     "filters": {"color": "red", "formula": "any", "finisherType": "glossy", "includeTopper": true}
///   }
///   ```
///
/// # Returns
/// JSON string with format:
///   ```json
///   {
///     "candidate": {"id": "...", "polish": {...}, "topper": null, "finisher": {...}, "used": false, ...},
///     "previouslyUsed": null
///   }
///   ```
#[uniffi::export]
pub fn pick_json(input_json: String) -> Result<String, PickerError> {
    crate::selector::pick_json(&input_json)
}

/// Collection and history statistics.
///
/// # Arguments
/// * `input_json` - JSON string with format:
///   ```json
///   {"catalog": {...}, "combinations": [...]}
///   ```
#[uniffi::export]
pub fn collection_stats_json(input_json: String) -> Result<String, PickerError> {
    crate::catalog::collection_stats_json(&input_json)
}

/// Polish counts per color, most common first.
#[uniffi::export]
pub fn color_breakdown_json(input_json: String) -> Result<Vec<TokenCount>, PickerError> {
    let stats: crate::catalog::CollectionStats =
        serde_json::from_str(&crate::catalog::collection_stats_json(&input_json)?)?;
    Ok(stats.color_breakdown)
}

/// Filter history and sort it newest first.
///
/// # Arguments
/// * `input_json` - JSON string with format:
///   ```json
///   {"combinations": [...], "query": {"text": "glitter", "hasPhoto": true}}
///   ```
#[uniffi::export]
pub fn query_history_json(input_json: String) -> Result<String, PickerError> {
    crate::history::query_history_json(&input_json)
}

/// Effective option list for an attribute kind.
///
/// # Arguments
/// * `input_json` - JSON string with format:
///   ```json
///   {"kind": "color", "registry": {"customColors": ["teal"]}, "catalog": {...}}
///   ```
#[uniffi::export]
pub fn attribute_values_json(input_json: String) -> Result<String, PickerError> {
    crate::attributes::attribute_values_json(&input_json)
}

/// Built-in values for an attribute kind.
#[uniffi::export]
pub fn builtin_attribute_values(kind: String) -> Result<Vec<String>, PickerError> {
    let kind: AttributeKind = kind.parse()?;
    Ok(kind.builtins().iter().map(|s| s.to_string()).collect())
}

/// Check an import file without applying it.
///
/// # Returns
/// JSON string with format:
///   ```json
///   {"polishes": 12, "toppers": null, "finishers": 3, "combinations": 40, "exportDate": "..."}
///   ```
#[uniffi::export]
pub fn validate_import_json(input_json: String) -> Result<String, PickerError> {
    crate::persistence::validate_import_json(&input_json)
}

/// Suggested export file name for a Unix timestamp in milliseconds.
#[uniffi::export]
pub fn export_file_name(timestamp_millis: i64) -> Result<String, PickerError> {
    let date = Utc
        .timestamp_millis_opt(timestamp_millis)
        .single()
        .ok_or_else(|| PickerError::MissingField("timestamp"))?;
    Ok(crate::persistence::export_file_name(date))
}
