//! Full-state export and import.
//!
//! The export document uses the local store's key names plus an
//! `exportDate`. On import every field is optional: fields present in the
//! file replace the in-memory collection, absent fields are left alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use super::AppState;
use crate::catalog::{Coat, Item, Keyed, Polish};
use crate::error::{PickerError, PickerResult};
use crate::history::{Combination, History};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nail_polishes: Option<Vec<Polish>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toppers: Option<Vec<Coat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishers: Option<Vec<Coat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_combinations: Option<Vec<Combination>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combo_photos: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_formulas: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_topper_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_finisher_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_brands: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_collections: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Everything in `state`, stamped with `now`.
    pub fn capture(state: &AppState, now: DateTime<Utc>) -> Self {
        let registry = &state.registry;
        Self {
            nail_polishes: Some(state.catalog.polishes.clone()),
            toppers: Some(state.catalog.toppers.clone()),
            finishers: Some(state.catalog.finishers.clone()),
            used_combinations: Some(state.history.entries().to_vec()),
            combo_photos: Some(state.media.clone()),
            custom_colors: Some(registry.custom_colors.clone()),
            custom_formulas: Some(registry.custom_formulas.clone()),
            custom_topper_types: Some(registry.custom_topper_types.clone()),
            custom_finisher_types: Some(registry.custom_finisher_types.clone()),
            custom_brands: Some(registry.custom_brands.clone()),
            custom_collections: Some(registry.custom_collections.clone()),
            export_date: Some(now),
        }
    }

    /// Parse and check an import file. Nothing is applied on error.
    pub fn parse(json: &str) -> PickerResult<Self> {
        let value: Value = serde_json::from_str(json).map_err(invalid)?;
        if !value.is_object() {
            return Err(PickerError::ImportFormatInvalid(
                "expected a JSON object".to_string(),
            ));
        }
        let mut snapshot: Snapshot = serde_json::from_value(value).map_err(invalid)?;
        snapshot.normalize_items()?;
        Ok(snapshot)
    }

    /// Normalize imported items the way the catalog does on add, then
    /// require every field and a unique (name, brand) per category.
    fn normalize_items(&mut self) -> PickerResult<()> {
        if let Some(polishes) = self.nail_polishes.take() {
            self.nail_polishes = Some(checked_items(polishes, Item::Polish, |item| match item {
                Item::Polish(p) => Some(p),
                _ => None,
            })?);
        }
        if let Some(toppers) = self.toppers.take() {
            self.toppers = Some(checked_items(toppers, Item::Topper, |item| match item {
                Item::Topper(c) => Some(c),
                _ => None,
            })?);
        }
        if let Some(finishers) = self.finishers.take() {
            self.finishers = Some(checked_items(finishers, Item::Finisher, |item| match item {
                Item::Finisher(c) => Some(c),
                _ => None,
            })?);
        }
        Ok(())
    }

    /// Replace every collection present in the snapshot.
    pub fn apply_to(self, state: &mut AppState) {
        if let Some(polishes) = self.nail_polishes {
            state.catalog.polishes = polishes;
        }
        if let Some(toppers) = self.toppers {
            state.catalog.toppers = toppers;
        }
        if let Some(finishers) = self.finishers {
            state.catalog.finishers = finishers;
        }
        if let Some(combinations) = self.used_combinations {
            state.history = History::from_entries(combinations);
        }
        if let Some(media) = self.combo_photos {
            state.media = media;
        }

        let registry = &mut state.registry;
        let customs = [
            (self.custom_colors, &mut registry.custom_colors),
            (self.custom_formulas, &mut registry.custom_formulas),
            (self.custom_topper_types, &mut registry.custom_topper_types),
            (self.custom_finisher_types, &mut registry.custom_finisher_types),
            (self.custom_brands, &mut registry.custom_brands),
            (self.custom_collections, &mut registry.custom_collections),
        ];
        for (incoming, target) in customs {
            if let Some(values) = incoming {
                *target = values;
            }
        }
    }

    pub fn to_json_pretty(&self) -> PickerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn checked_items<T>(
    items: Vec<T>,
    wrap: fn(T) -> Item,
    unwrap: fn(Item) -> Option<T>,
) -> PickerResult<Vec<T>> {
    let mut seen = HashSet::with_capacity(items.len());
    let mut checked = Vec::with_capacity(items.len());
    for item in items {
        let item = wrap(item).normalized();
        item.validate().map_err(|e| {
            PickerError::ImportFormatInvalid(format!("{} in {}: {}", item.name(), item.category(), e))
        })?;
        if !seen.insert(item.key()) {
            return Err(PickerError::ImportFormatInvalid(format!(
                "duplicate {} {}",
                item.category(),
                item.key()
            )));
        }
        checked.extend(unwrap(item));
    }
    Ok(checked)
}

fn invalid(err: serde_json::Error) -> PickerError {
    PickerError::ImportFormatInvalid(err.to_string())
}

/// Suggested download name, e.g. `nail-polish-data-2024-03-01.json`.
pub fn export_file_name(date: DateTime<Utc>) -> String {
    format!("nail-polish-data-{}.json", date.format("%Y-%m-%d"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportSummary {
    polishes: Option<usize>,
    toppers: Option<usize>,
    finishers: Option<usize>,
    combinations: Option<usize>,
    export_date: Option<DateTime<Utc>>,
}

/// Check an import file without applying it.
/// Returns a JSON summary of what the file would replace; absent
/// collections are `null`.
/// Convenience function for FFI.
pub fn validate_import_json(input_json: &str) -> PickerResult<String> {
    let snapshot = Snapshot::parse(input_json)?;
    let summary = ImportSummary {
        polishes: snapshot.nail_polishes.as_ref().map(Vec::len),
        toppers: snapshot.toppers.as_ref().map(Vec::len),
        finishers: snapshot.finishers.as_ref().map(Vec::len),
        combinations: snapshot.used_combinations.as_ref().map(Vec::len),
        export_date: snapshot.export_date,
    };
    Ok(serde_json::to_string(&summary)?)
}
