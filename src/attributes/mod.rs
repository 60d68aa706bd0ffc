//! Attribute registry: built-in option lists merged with user-added values.
//!
//! Color, formula and type tokens are lowercased. Brand and collection
//! values keep their case, and also include values already used by catalog
//! items.

mod builtins;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::{eq_folded, Catalog};
use crate::error::{PickerError, PickerResult};
pub use builtins::{BUILTIN_COLORS, BUILTIN_FINISHER_TYPES, BUILTIN_FORMULAS, BUILTIN_TOPPER_TYPES};

/// Attribute categories that accept custom values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeKind {
    Color,
    Formula,
    TopperType,
    FinisherType,
    Brand,
    Collection,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 6] = [
        AttributeKind::Color,
        AttributeKind::Formula,
        AttributeKind::TopperType,
        AttributeKind::FinisherType,
        AttributeKind::Brand,
        AttributeKind::Collection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Color => "color",
            AttributeKind::Formula => "formula",
            AttributeKind::TopperType => "topperType",
            AttributeKind::FinisherType => "finisherType",
            AttributeKind::Brand => "brand",
            AttributeKind::Collection => "collection",
        }
    }

    pub fn builtins(&self) -> &'static [&'static str] {
        match self {
            AttributeKind::Color => BUILTIN_COLORS,
            AttributeKind::Formula => BUILTIN_FORMULAS,
            AttributeKind::TopperType => BUILTIN_TOPPER_TYPES,
            AttributeKind::FinisherType => BUILTIN_FINISHER_TYPES,
            AttributeKind::Brand | AttributeKind::Collection => &[],
        }
    }

    /// Whether values of this kind are lowercase tokens.
    pub fn is_token(&self) -> bool {
        !matches!(self, AttributeKind::Brand | AttributeKind::Collection)
    }

    /// Trim, and lowercase for token kinds.
    pub fn normalize(&self, value: &str) -> String {
        let trimmed = value.trim();
        if self.is_token() {
            trimmed.to_lowercase()
        } else {
            trimmed.to_string()
        }
    }

    fn same(&self, a: &str, b: &str) -> bool {
        if self.is_token() {
            a == b
        } else {
            eq_folded(a, b)
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeKind {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "color" | "colors" => Ok(AttributeKind::Color),
            "formula" | "formulas" => Ok(AttributeKind::Formula),
            "toppertype" | "toppertypes" => Ok(AttributeKind::TopperType),
            "finishertype" | "finishertypes" => Ok(AttributeKind::FinisherType),
            "brand" | "brands" => Ok(AttributeKind::Brand),
            "collection" | "collections" => Ok(AttributeKind::Collection),
            _ => Err(PickerError::InvalidCategory(s.to_string())),
        }
    }
}

/// Result of adding a custom value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

/// User-added attribute values, one list per kind, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttributeRegistry {
    pub custom_colors: Vec<String>,
    pub custom_formulas: Vec<String>,
    pub custom_topper_types: Vec<String>,
    pub custom_finisher_types: Vec<String>,
    pub custom_brands: Vec<String>,
    pub custom_collections: Vec<String>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customs(&self, kind: AttributeKind) -> &[String] {
        match kind {
            AttributeKind::Color => &self.custom_colors,
            AttributeKind::Formula => &self.custom_formulas,
            AttributeKind::TopperType => &self.custom_topper_types,
            AttributeKind::FinisherType => &self.custom_finisher_types,
            AttributeKind::Brand => &self.custom_brands,
            AttributeKind::Collection => &self.custom_collections,
        }
    }

    fn customs_mut(&mut self, kind: AttributeKind) -> &mut Vec<String> {
        match kind {
            AttributeKind::Color => &mut self.custom_colors,
            AttributeKind::Formula => &mut self.custom_formulas,
            AttributeKind::TopperType => &mut self.custom_topper_types,
            AttributeKind::FinisherType => &mut self.custom_finisher_types,
            AttributeKind::Brand => &mut self.custom_brands,
            AttributeKind::Collection => &mut self.custom_collections,
        }
    }

    /// Effective option list for a kind.
    ///
    /// Built-ins first, then customs, then (brand/collection only) values used
    /// by catalog items. Deduplicated, first occurrence wins.
    pub fn all_values(&self, kind: AttributeKind, catalog: &Catalog) -> Vec<String> {
        let item_values = match kind {
            AttributeKind::Brand => catalog.brands(),
            AttributeKind::Collection => catalog.collections(),
            _ => Vec::new(),
        };

        let candidates = kind
            .builtins()
            .iter()
            .map(|v| v.to_string())
            .chain(self.customs(kind).iter().map(|v| kind.normalize(v)))
            .chain(item_values);

        let mut values: Vec<String> = Vec::new();
        for value in candidates {
            if !value.is_empty() && !values.iter().any(|v| kind.same(v, &value)) {
                values.push(value);
            }
        }
        values
    }

    /// Add a custom value. A value already offered for the kind is a no-op.
    pub fn add_custom(
        &mut self,
        kind: AttributeKind,
        value: &str,
        catalog: &Catalog,
    ) -> PickerResult<AddOutcome> {
        let value = kind.normalize(value);
        if value.is_empty() {
            return Err(PickerError::MissingField("value"));
        }

        if self
            .all_values(kind, catalog)
            .iter()
            .any(|existing| kind.same(existing, &value))
        {
            return Ok(AddOutcome::AlreadyExists);
        }

        self.customs_mut(kind).push(value);
        Ok(AddOutcome::Added)
    }

    /// Remove a custom value and return it. Built-ins cannot be removed.
    pub fn remove_custom(&mut self, kind: AttributeKind, value: &str) -> PickerResult<String> {
        let value = kind.normalize(value);
        let customs = self.customs_mut(kind);
        let index = customs
            .iter()
            .position(|existing| kind.same(&kind.normalize(existing), &value))
            .ok_or_else(|| PickerError::NotFound(format!("custom {} \"{}\"", kind, value)))?;
        Ok(customs.remove(index))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeValuesInput {
    kind: String,
    #[serde(default)]
    registry: AttributeRegistry,
    #[serde(default)]
    catalog: Catalog,
}

/// List the effective values for a kind from JSON input
/// `{"kind": "color", "registry": {...}, "catalog": {...}}`.
/// Convenience function for FFI.
pub fn attribute_values_json(input_json: &str) -> PickerResult<String> {
    let input: AttributeValuesInput = serde_json::from_str(input_json)?;
    let kind: AttributeKind = input.kind.parse()?;
    let values = input.registry.all_values(kind, &input.catalog);
    Ok(serde_json::to_string(&values)?)
}
