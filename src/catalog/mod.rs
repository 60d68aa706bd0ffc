//! Catalog store for owned polishes, toppers and finishers.
//!
//! Items are identified by their (name, brand) pair within a category.
//! All mutations here are synchronous and in-memory; mirroring them to the
//! active backend is done by [`crate::context::PickerContext`].

mod query;
mod stats;
mod types;

use serde::{Deserialize, Serialize};

use crate::error::{PickerError, PickerResult};

pub use query::{sorted_coats, PolishQuery};
pub use stats::{collection_stats, collection_stats_json, CollectionStats, TokenCount};
pub use types::{eq_folded, Coat, Finisher, Item, ItemCategory, ItemKey, Keyed, Polish, Topper};

/// The user's owned items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub polishes: Vec<Polish>,
    pub toppers: Vec<Topper>,
    pub finishers: Vec<Finisher>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to its category.
    ///
    /// Text fields are trimmed and attribute tokens lowercased before the
    /// required-field and duplicate checks. Returns the stored copy.
    pub fn add(&mut self, item: Item) -> PickerResult<Item> {
        let item = item.normalized();
        item.validate()?;

        if self.contains(item.category(), item.name(), item.brand()) {
            return Err(PickerError::DuplicateItem {
                category: item.category().to_string(),
                name: item.name().to_string(),
                brand: item.brand().to_string(),
            });
        }

        match &item {
            Item::Polish(p) => self.polishes.push(p.clone()),
            Item::Topper(c) => self.toppers.push(c.clone()),
            Item::Finisher(c) => self.finishers.push(c.clone()),
        }
        Ok(item)
    }

    /// Remove the item with the given key and return it.
    pub fn remove(&mut self, category: ItemCategory, name: &str, brand: &str) -> PickerResult<Item> {
        let not_found = || {
            PickerError::NotFound(format!("{} {}", category, ItemKey::new(name, brand)))
        };

        match category {
            ItemCategory::Polish => {
                let index = position(&self.polishes, name, brand).ok_or_else(not_found)?;
                Ok(Item::Polish(self.polishes.remove(index)))
            }
            ItemCategory::Topper => {
                let index = position(&self.toppers, name, brand).ok_or_else(not_found)?;
                Ok(Item::Topper(self.toppers.remove(index)))
            }
            ItemCategory::Finisher => {
                let index = position(&self.finishers, name, brand).ok_or_else(not_found)?;
                Ok(Item::Finisher(self.finishers.remove(index)))
            }
        }
    }

    /// Replace the polish stored under `key` with `patched`.
    ///
    /// The polish keeps its position in the list. Renaming onto the key of a
    /// different existing polish is rejected.
    pub fn update_polish(&mut self, key: &ItemKey, patched: Polish) -> PickerResult<Polish> {
        let index = position(&self.polishes, &key.name, &key.brand)
            .ok_or_else(|| PickerError::NotFound(format!("polish {}", key)))?;

        let patched = types::normalize_polish(patched);
        Item::Polish(patched.clone()).validate()?;

        let clashes = self
            .polishes
            .iter()
            .enumerate()
            .any(|(i, p)| i != index && p.has_key(&patched.name, &patched.brand));
        if clashes {
            return Err(PickerError::DuplicateItem {
                category: ItemCategory::Polish.to_string(),
                name: patched.name,
                brand: patched.brand,
            });
        }

        self.polishes[index] = patched.clone();
        Ok(patched)
    }

    pub fn contains(&self, category: ItemCategory, name: &str, brand: &str) -> bool {
        match category {
            ItemCategory::Polish => position(&self.polishes, name, brand).is_some(),
            ItemCategory::Topper => position(&self.toppers, name, brand).is_some(),
            ItemCategory::Finisher => position(&self.finishers, name, brand).is_some(),
        }
    }

    pub fn len(&self, category: ItemCategory) -> usize {
        match category {
            ItemCategory::Polish => self.polishes.len(),
            ItemCategory::Topper => self.toppers.len(),
            ItemCategory::Finisher => self.finishers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polishes.is_empty() && self.toppers.is_empty() && self.finishers.is_empty()
    }

    /// Brands used by any item, in first-seen order.
    pub fn brands(&self) -> Vec<String> {
        let all = self
            .polishes
            .iter()
            .map(|p| p.brand.as_str())
            .chain(self.toppers.iter().map(|c| c.brand.as_str()))
            .chain(self.finishers.iter().map(|c| c.brand.as_str()));
        unique(all)
    }

    /// Collections used by any item, in first-seen order.
    pub fn collections(&self) -> Vec<String> {
        let all = self
            .polishes
            .iter()
            .filter_map(|p| p.collection.as_deref())
            .chain(self.toppers.iter().filter_map(|c| c.collection.as_deref()))
            .chain(self.finishers.iter().filter_map(|c| c.collection.as_deref()));
        unique(all)
    }
}

fn position<T: Keyed>(items: &[T], name: &str, brand: &str) -> Option<usize> {
    items.iter().position(|item| item.has_key(name, brand))
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}
