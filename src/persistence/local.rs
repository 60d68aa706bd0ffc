//! Device-local persistence: one JSON value per top-level collection.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{AppState, PersistenceBackend};
use crate::attributes::{AttributeKind, AttributeRegistry};
use crate::catalog::{Catalog, Item, ItemCategory, ItemKey, Polish};
use crate::error::{PickerError, PickerResult};
use crate::history::{Combination, CombinationId, History, MediaRef};
use crate::media::{self, MediaKind, MediaUpload};

/// Storage keys, shared with data written by earlier app versions.
pub mod keys {
    use crate::attributes::AttributeKind;
    use crate::catalog::ItemCategory;

    pub const POLISHES: &str = "nailPolishes";
    pub const TOPPERS: &str = "toppers";
    pub const FINISHERS: &str = "finishers";
    pub const COMBO_PHOTOS: &str = "comboPhotos";
    pub const USED_COMBINATIONS: &str = "usedCombinations";
    pub const CUSTOM_COLORS: &str = "customColors";
    pub const CUSTOM_FORMULAS: &str = "customFormulas";
    pub const CUSTOM_TOPPER_TYPES: &str = "customTopperTypes";
    pub const CUSTOM_FINISHER_TYPES: &str = "customFinisherTypes";
    pub const CUSTOM_BRANDS: &str = "customBrands";
    pub const CUSTOM_COLLECTIONS: &str = "customCollections";

    pub fn category(category: ItemCategory) -> &'static str {
        match category {
            ItemCategory::Polish => POLISHES,
            ItemCategory::Topper => TOPPERS,
            ItemCategory::Finisher => FINISHERS,
        }
    }

    pub fn custom(kind: AttributeKind) -> &'static str {
        match kind {
            AttributeKind::Color => CUSTOM_COLORS,
            AttributeKind::Formula => CUSTOM_FORMULAS,
            AttributeKind::TopperType => CUSTOM_TOPPER_TYPES,
            AttributeKind::FinisherType => CUSTOM_FINISHER_TYPES,
            AttributeKind::Brand => CUSTOM_BRANDS,
            AttributeKind::Collection => CUSTOM_COLLECTIONS,
        }
    }
}

/// Synchronous key-value store on the device.
pub trait LocalStore: Send + Sync {
    /// Stored value for `key`, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value) -> PickerResult<()>;
}

/// In-process [`LocalStore`].
#[derive(Debug, Default)]
pub struct MemoryLocalStore {
    entries: Mutex<HashMap<String, Value>>,
    fail_writes: AtomicBool,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `set` fail (quota exceeded, private mode...).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

impl LocalStore for MemoryLocalStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> PickerResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PickerError::LocalStoreFailed(format!("write to {} rejected", key)));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| PickerError::LocalStoreFailed(e.to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Anonymous-session backend.
///
/// Every write stores the full affected collection. History is unbounded.
pub struct LocalBackend {
    store: Arc<dyn LocalStore>,
}

impl LocalBackend {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Read one key. Absent or malformed values fall back to the default.
    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(value) = self.store.get(key) else {
            return T::default();
        };
        if value.is_null() {
            return T::default();
        }
        match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Ignoring malformed local value for {}: {}", key, e);
                T::default()
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> PickerResult<()> {
        let value = serde_json::to_value(value)?;
        self.store.set(key, value)
    }

    fn write_category(&self, category: ItemCategory, catalog: &Catalog) -> PickerResult<()> {
        let key = keys::category(category);
        match category {
            ItemCategory::Polish => self.write(key, &catalog.polishes),
            ItemCategory::Topper => self.write(key, &catalog.toppers),
            ItemCategory::Finisher => self.write(key, &catalog.finishers),
        }
    }

    fn write_custom(&self, kind: AttributeKind, registry: &AttributeRegistry) -> PickerResult<()> {
        self.write(keys::custom(kind), registry.customs(kind))
    }

    fn write_history(&self, state: &AppState) -> PickerResult<()> {
        self.write(keys::USED_COMBINATIONS, state.history.entries())?;
        self.write(keys::COMBO_PHOTOS, &state.media)
    }
}

#[async_trait]
impl PersistenceBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn load(&mut self) -> PickerResult<AppState> {
        let catalog = Catalog {
            polishes: self.read(keys::POLISHES),
            toppers: self.read(keys::TOPPERS),
            finishers: self.read(keys::FINISHERS),
        };
        let registry = AttributeRegistry {
            custom_colors: self.read(keys::CUSTOM_COLORS),
            custom_formulas: self.read(keys::CUSTOM_FORMULAS),
            custom_topper_types: self.read(keys::CUSTOM_TOPPER_TYPES),
            custom_finisher_types: self.read(keys::CUSTOM_FINISHER_TYPES),
            custom_brands: self.read(keys::CUSTOM_BRANDS),
            custom_collections: self.read(keys::CUSTOM_COLLECTIONS),
        };
        let history = History::from_entries(self.read::<Vec<Combination>>(keys::USED_COMBINATIONS));

        tracing::debug!(
            "Loaded local state: {} polishes, {} combinations",
            catalog.polishes.len(),
            history.len()
        );

        Ok(AppState {
            catalog,
            registry,
            history,
            media: self.read(keys::COMBO_PHOTOS),
        })
    }

    async fn item_added(&mut self, item: &Item, state: &AppState) -> PickerResult<()> {
        self.write_category(item.category(), &state.catalog)
    }

    async fn item_removed(
        &mut self,
        category: ItemCategory,
        _key: &ItemKey,
        state: &AppState,
    ) -> PickerResult<()> {
        self.write_category(category, &state.catalog)
    }

    async fn polish_updated(&mut self, _key: &ItemKey, _polish: &Polish, state: &AppState) -> PickerResult<()> {
        self.write_category(ItemCategory::Polish, &state.catalog)
    }

    async fn attributes_changed(&mut self, kind: AttributeKind, state: &AppState) -> PickerResult<()> {
        self.write_custom(kind, &state.registry)
    }

    async fn combination_added(&mut self, _combination: &Combination, state: &AppState) -> PickerResult<()> {
        self.write_history(state)
    }

    async fn combination_updated(&mut self, _combination: &Combination, state: &AppState) -> PickerResult<()> {
        self.write_history(state)
    }

    async fn combination_removed(&mut self, _removed: &Combination, state: &AppState) -> PickerResult<()> {
        self.write_history(state)
    }

    async fn store_media(&mut self, id: &CombinationId, upload: &MediaUpload) -> PickerResult<MediaRef> {
        tracing::debug!(
            "Encoding {} for combination {} inline ({} bytes)",
            upload.kind,
            id,
            upload.bytes.len()
        );
        Ok(MediaRef::Inline(media::data_uri(upload)))
    }

    async fn release_media(&mut self, _kind: MediaKind, _media: &MediaRef) -> PickerResult<()> {
        // Inline media lives in the media map, which is rewritten with the history.
        Ok(())
    }

    async fn replace_all(&mut self, state: &AppState) -> PickerResult<()> {
        for category in ItemCategory::ALL {
            self.write_category(category, &state.catalog)?;
        }
        for kind in AttributeKind::ALL {
            self.write_custom(kind, &state.registry)?;
        }
        self.write_history(state)
    }
}
