//! Catalog item records.
//!
//! Field names follow the stored JSON (camelCase) so that the same records
//! round-trip through the local store, the remote document and exported
//! snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PickerError, PickerResult};

/// The three kinds of catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemCategory {
    Polish,
    Topper,
    Finisher,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 3] = [
        ItemCategory::Polish,
        ItemCategory::Topper,
        ItemCategory::Finisher,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Polish => "polish",
            ItemCategory::Topper => "topper",
            ItemCategory::Finisher => "finisher",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "polish" | "polishes" => Ok(ItemCategory::Polish),
            "topper" | "toppers" => Ok(ItemCategory::Topper),
            "finisher" | "finishers" => Ok(ItemCategory::Finisher),
            _ => Err(PickerError::InvalidCategory(s.to_string())),
        }
    }
}

/// Natural key of an item within its category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub name: String,
    pub brand: String,
}

impl ItemKey {
    pub fn new(name: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
        }
    }

    pub fn matches(&self, name: &str, brand: &str) -> bool {
        self.name == name && self.brand == brand
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" by {}", self.name, self.brand)
    }
}

/// Anything identified by (name, brand).
pub trait Keyed {
    fn name(&self) -> &str;
    fn brand(&self) -> &str;

    fn key(&self) -> ItemKey {
        ItemKey::new(self.name(), self.brand())
    }

    fn has_key(&self, name: &str, brand: &str) -> bool {
        self.name() == name && self.brand() == brand
    }
}

/// A nail polish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PolishRecord")]
pub struct Polish {
    pub name: String,
    pub brand: String,
    pub colors: Vec<String>,
    pub formula: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Set when the polish is written to the remote document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl Polish {
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        colors: Vec<String>,
        formula: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
            colors,
            formula: formula.into(),
            collection: None,
            id: None,
            added_at: None,
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = non_empty(collection.into());
        self
    }

    /// Case-insensitive color membership.
    pub fn has_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| eq_folded(c, color))
    }
}

impl Keyed for Polish {
    fn name(&self) -> &str {
        &self.name
    }

    fn brand(&self) -> &str {
        &self.brand
    }
}

/// Stored shape of a polish. Older local data carries a single `color`
/// string instead of the `colors` list.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolishRecord {
    name: String,
    brand: String,
    #[serde(default)]
    colors: Vec<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    formula: String,
    #[serde(default)]
    collection: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default)]
    added_at: Option<DateTime<Utc>>,
}

impl From<PolishRecord> for Polish {
    fn from(record: PolishRecord) -> Self {
        let mut colors = record.colors;
        if colors.is_empty() {
            if let Some(color) = record.color.filter(|c| !c.is_empty()) {
                colors.push(color);
            }
        }

        Polish {
            name: record.name,
            brand: record.brand,
            colors,
            formula: record.formula,
            collection: record.collection.and_then(non_empty),
            id: record.id,
            added_at: record.added_at,
        }
    }
}

/// A topper or finisher. Both carry a single `type` token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coat {
    pub name: String,
    pub brand: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub collection: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_id"
    )]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

pub type Topper = Coat;
pub type Finisher = Coat;

impl Coat {
    pub fn new(name: impl Into<String>, brand: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
            kind: kind.into(),
            collection: None,
            id: None,
            added_at: None,
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = non_empty(collection.into());
        self
    }
}

impl Keyed for Coat {
    fn name(&self) -> &str {
        &self.name
    }

    fn brand(&self) -> &str {
        &self.brand
    }
}

/// A catalog entry of any category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "camelCase")]
pub enum Item {
    Polish(Polish),
    Topper(Coat),
    Finisher(Coat),
}

impl Item {
    pub fn category(&self) -> ItemCategory {
        match self {
            Item::Polish(_) => ItemCategory::Polish,
            Item::Topper(_) => ItemCategory::Topper,
            Item::Finisher(_) => ItemCategory::Finisher,
        }
    }

    pub fn collection(&self) -> Option<&str> {
        match self {
            Item::Polish(p) => p.collection.as_deref(),
            Item::Topper(c) | Item::Finisher(c) => c.collection.as_deref(),
        }
    }

    /// Trim text fields and lowercase attribute tokens.
    pub(crate) fn normalized(self) -> Self {
        match self {
            Item::Polish(p) => Item::Polish(normalize_polish(p)),
            Item::Topper(c) => Item::Topper(normalize_coat(c)),
            Item::Finisher(c) => Item::Finisher(normalize_coat(c)),
        }
    }

    /// Required-field check. Expects a normalized item.
    pub fn validate(&self) -> PickerResult<()> {
        if self.name().is_empty() {
            return Err(PickerError::MissingField("name"));
        }
        if self.brand().is_empty() {
            return Err(PickerError::MissingField("brand"));
        }
        match self {
            Item::Polish(p) => {
                if p.colors.is_empty() {
                    return Err(PickerError::MissingField("colors"));
                }
                if p.formula.is_empty() {
                    return Err(PickerError::MissingField("formula"));
                }
            }
            Item::Topper(c) | Item::Finisher(c) => {
                if c.kind.is_empty() {
                    return Err(PickerError::MissingField("type"));
                }
            }
        }
        Ok(())
    }
}

impl Keyed for Item {
    fn name(&self) -> &str {
        match self {
            Item::Polish(p) => &p.name,
            Item::Topper(c) | Item::Finisher(c) => &c.name,
        }
    }

    fn brand(&self) -> &str {
        match self {
            Item::Polish(p) => &p.brand,
            Item::Topper(c) | Item::Finisher(c) => &c.brand,
        }
    }
}

pub(crate) fn normalize_polish(mut polish: Polish) -> Polish {
    polish.name = polish.name.trim().to_string();
    polish.brand = polish.brand.trim().to_string();
    polish.formula = polish.formula.trim().to_lowercase();
    let mut colors: Vec<String> = Vec::with_capacity(polish.colors.len());
    for color in polish.colors.iter().map(|c| c.trim().to_lowercase()) {
        if !color.is_empty() && !colors.contains(&color) {
            colors.push(color);
        }
    }
    polish.colors = colors;
    polish.collection = polish.collection.and_then(non_empty);
    polish
}

fn normalize_coat(mut coat: Coat) -> Coat {
    coat.name = coat.name.trim().to_string();
    coat.brand = coat.brand.trim().to_string();
    coat.kind = coat.kind.trim().to_lowercase();
    coat.collection = coat.collection.and_then(non_empty);
    coat
}

/// Case-insensitive comparison using the same Unicode lowercasing as
/// normalization.
pub fn eq_folded(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(non_empty))
}

/// Ids were written as numbers by older clients and as strings by newer ones.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    let value: Option<RawId> = Option::deserialize(deserializer)?;
    Ok(value.map(|raw| match raw {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    }))
}
