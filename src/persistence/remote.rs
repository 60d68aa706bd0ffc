//! Per-user remote persistence: one document per uid plus object storage
//! for combination media.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{keys, AppState, PersistenceBackend};
use crate::attributes::{AttributeKind, AttributeRegistry};
use crate::catalog::{Catalog, Coat, Item, ItemCategory, ItemKey, Keyed, Polish};
use crate::error::{PickerError, PickerResult};
use crate::history::{Combination, CombinationId, History, MediaRef, RemoteMedia};
use crate::media::{self, MediaKind, MediaUpload};

const POLISH_COLLECTION: &str = "polishCollection";
const TOPPER_COLLECTION: &str = "topperCollection";
const FINISHER_COLLECTION: &str = "finisherCollection";
const RECENT_COMBINATIONS: &str = "recentCombinations";
const UPDATED_AT: &str = "updatedAt";

fn collection_field(category: ItemCategory) -> &'static str {
    match category {
        ItemCategory::Polish => POLISH_COLLECTION,
        ItemCategory::Topper => TOPPER_COLLECTION,
        ItemCategory::Finisher => FINISHER_COLLECTION,
    }
}

/// The per-user document.
///
/// Collection fields are optional so documents written by older clients can
/// be told apart from empty ones and backfilled on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polish_collection: Option<Vec<Polish>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topper_collection: Option<Vec<Coat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finisher_collection: Option<Vec<Coat>>,
    /// Newest first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_combinations: Option<Vec<Combination>>,
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
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserDocument {
    /// A fresh document with every collection present and empty.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            polish_collection: Some(Vec::new()),
            topper_collection: Some(Vec::new()),
            finisher_collection: Some(Vec::new()),
            recent_combinations: Some(Vec::new()),
            custom_colors: Some(Vec::new()),
            custom_formulas: Some(Vec::new()),
            custom_topper_types: Some(Vec::new()),
            custom_finisher_types: Some(Vec::new()),
            custom_brands: Some(Vec::new()),
            custom_collections: Some(Vec::new()),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Empty values for every collection field the document lacks.
    pub fn missing_fields(&self) -> Map<String, Value> {
        let present = [
            (POLISH_COLLECTION, self.polish_collection.is_some()),
            (TOPPER_COLLECTION, self.topper_collection.is_some()),
            (FINISHER_COLLECTION, self.finisher_collection.is_some()),
            (RECENT_COMBINATIONS, self.recent_combinations.is_some()),
            (keys::CUSTOM_COLORS, self.custom_colors.is_some()),
            (keys::CUSTOM_FORMULAS, self.custom_formulas.is_some()),
            (keys::CUSTOM_TOPPER_TYPES, self.custom_topper_types.is_some()),
            (keys::CUSTOM_FINISHER_TYPES, self.custom_finisher_types.is_some()),
            (keys::CUSTOM_BRANDS, self.custom_brands.is_some()),
            (keys::CUSTOM_COLLECTIONS, self.custom_collections.is_some()),
        ];
        present
            .into_iter()
            .filter(|(_, is_present)| !is_present)
            .map(|(field, _)| (field.to_string(), Value::Array(Vec::new())))
            .collect()
    }

    pub fn into_state(self) -> AppState {
        let mut recent = self.recent_combinations.unwrap_or_default();
        recent.reverse();

        AppState {
            catalog: Catalog {
                polishes: self.polish_collection.unwrap_or_default(),
                toppers: self.topper_collection.unwrap_or_default(),
                finishers: self.finisher_collection.unwrap_or_default(),
            },
            registry: AttributeRegistry {
                custom_colors: self.custom_colors.unwrap_or_default(),
                custom_formulas: self.custom_formulas.unwrap_or_default(),
                custom_topper_types: self.custom_topper_types.unwrap_or_default(),
                custom_finisher_types: self.custom_finisher_types.unwrap_or_default(),
                custom_brands: self.custom_brands.unwrap_or_default(),
                custom_collections: self.custom_collections.unwrap_or_default(),
            },
            history: History::from_entries(recent),
            media: BTreeMap::new(),
        }
    }
}

/// Per-user document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, uid: &str) -> PickerResult<Option<UserDocument>>;

    /// Create the document unless one exists. Returns whether it was created.
    async fn create_if_absent(&self, uid: &str, document: &UserDocument) -> PickerResult<bool>;

    /// Overwrite the given top-level fields, leaving the others untouched.
    async fn update_fields(&self, uid: &str, fields: Map<String, Value>) -> PickerResult<()>;

    /// Append one value to an array field, creating the field if needed.
    async fn array_append(&self, uid: &str, field: &str, value: Value) -> PickerResult<()>;
}

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub path: String,
}

/// Blob storage for media.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        namespace: &str,
        file_name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> PickerResult<StoredObject>;

    async fn delete(&self, path: &str) -> PickerResult<()>;
}

/// In-process [`DocumentStore`] with failure injection.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<String, Map<String, Value>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Store a raw document, bypassing the typed shape.
    pub fn insert_raw(&self, uid: &str, document: Map<String, Value>) -> PickerResult<()> {
        self.lock()?.insert(uid.to_string(), document);
        Ok(())
    }

    /// Raw fields of a stored document.
    pub fn raw(&self, uid: &str) -> Option<Map<String, Value>> {
        self.documents.lock().ok()?.get(uid).cloned()
    }

    fn lock(&self) -> PickerResult<std::sync::MutexGuard<'_, HashMap<String, Map<String, Value>>>> {
        self.documents
            .lock()
            .map_err(|e| PickerError::RemoteWriteFailed(e.to_string()))
    }

    fn check_writable(&self) -> PickerResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PickerError::RemoteWriteFailed("document store unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, uid: &str) -> PickerResult<Option<UserDocument>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PickerError::RemoteReadFailed("document store unavailable".into()));
        }
        let raw = self
            .documents
            .lock()
            .map_err(|e| PickerError::RemoteReadFailed(e.to_string()))?
            .get(uid)
            .cloned();

        raw.map(|fields| {
            serde_json::from_value(Value::Object(fields))
                .map_err(|e| PickerError::RemoteReadFailed(e.to_string()))
        })
        .transpose()
    }

    async fn create_if_absent(&self, uid: &str, document: &UserDocument) -> PickerResult<bool> {
        self.check_writable()?;
        let mut documents = self.lock()?;
        if documents.contains_key(uid) {
            return Ok(false);
        }
        let fields = match serde_json::to_value(document)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        documents.insert(uid.to_string(), fields);
        Ok(true)
    }

    async fn update_fields(&self, uid: &str, fields: Map<String, Value>) -> PickerResult<()> {
        self.check_writable()?;
        let mut documents = self.lock()?;
        let document = documents
            .get_mut(uid)
            .ok_or_else(|| PickerError::RemoteWriteFailed(format!("no document for {}", uid)))?;
        document.extend(fields);
        Ok(())
    }

    async fn array_append(&self, uid: &str, field: &str, value: Value) -> PickerResult<()> {
        self.check_writable()?;
        let mut documents = self.lock()?;
        let document = documents
            .get_mut(uid)
            .ok_or_else(|| PickerError::RemoteWriteFailed(format!("no document for {}", uid)))?;

        match document.entry(field.to_string()).or_insert_with(|| Value::Array(Vec::new())) {
            Value::Array(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(PickerError::RemoteWriteFailed(format!("{} is not an array", field))),
        }
    }
}

/// In-process [`ObjectStorage`] with failure injection.
#[derive(Debug, Default)]
pub struct MemoryObjectStorage {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn paths(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(
        &self,
        namespace: &str,
        file_name: &str,
        bytes: &[u8],
        _mime_type: &str,
    ) -> PickerResult<StoredObject> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(PickerError::UploadFailed("storage unavailable".into()));
        }
        let path = format!("{}/{}", namespace, file_name);
        self.objects
            .lock()
            .map_err(|e| PickerError::UploadFailed(e.to_string()))?
            .insert(path.clone(), bytes.to_vec());

        Ok(StoredObject {
            url: format!("memory://{}", path),
            path,
        })
    }

    async fn delete(&self, path: &str) -> PickerResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(PickerError::RemoteWriteFailed(format!("cannot delete {}", path)));
        }
        self.objects
            .lock()
            .map_err(|e| PickerError::RemoteWriteFailed(e.to_string()))?
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| PickerError::NotFound(path.to_string()))
    }
}

/// Authenticated-session backend.
///
/// Items are appended with an `id` and `addedAt` stamp; removals and edits
/// read the stored array, rewrite it and store it back. Only the newest
/// `history_cap` combinations are kept.
pub struct RemoteBackend {
    uid: String,
    documents: Arc<dyn DocumentStore>,
    objects: Arc<dyn ObjectStorage>,
    history_cap: usize,
}

impl RemoteBackend {
    pub fn new(
        uid: impl Into<String>,
        documents: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStorage>,
        history_cap: usize,
    ) -> Self {
        Self {
            uid: uid.into(),
            documents,
            objects,
            history_cap,
        }
    }

    async fn ensure_document(&self) -> PickerResult<()> {
        let created = self
            .documents
            .create_if_absent(&self.uid, &UserDocument::empty(Utc::now()))
            .await?;
        if created {
            tracing::info!("Created user document for {}", self.uid);
        }
        Ok(())
    }

    async fn current(&self) -> PickerResult<UserDocument> {
        self.documents
            .get(&self.uid)
            .await?
            .ok_or_else(|| PickerError::RemoteReadFailed(format!("no document for {}", self.uid)))
    }

    /// Write fields and bump `updatedAt`.
    async fn write(&self, mut fields: Map<String, Value>) -> PickerResult<()> {
        fields.insert(UPDATED_AT.to_string(), serde_json::to_value(Utc::now())?);
        self.documents.update_fields(&self.uid, fields).await
    }

    async fn write_field<T: Serialize + Sync + ?Sized>(&self, field: &str, value: &T) -> PickerResult<()> {
        let mut fields = Map::new();
        fields.insert(field.to_string(), serde_json::to_value(value)?);
        self.write(fields).await
    }

    async fn rewrite_collection(&self, category: ItemCategory, key: &ItemKey) -> PickerResult<()> {
        let document = self.current().await?;
        let field = collection_field(category);
        match category {
            ItemCategory::Polish => {
                let mut polishes = document.polish_collection.unwrap_or_default();
                polishes.retain(|p| !p.has_key(&key.name, &key.brand));
                self.write_field(field, &polishes).await
            }
            ItemCategory::Topper | ItemCategory::Finisher => {
                let mut coats = match category {
                    ItemCategory::Topper => document.topper_collection,
                    _ => document.finisher_collection,
                }
                .unwrap_or_default();
                coats.retain(|c| !c.has_key(&key.name, &key.brand));
                self.write_field(field, &coats).await
            }
        }
    }

    fn recent_from(&self, history: &History) -> Vec<Combination> {
        history
            .entries()
            .iter()
            .rev()
            .take(self.history_cap)
            .cloned()
            .collect()
    }
}

fn stamp(item: &Item, now: DateTime<Utc>) -> PickerResult<Value> {
    let id = Some(now.timestamp_millis().to_string());
    let value = match item {
        Item::Polish(polish) => {
            let mut polish = polish.clone();
            polish.id = id;
            polish.added_at = Some(now);
            serde_json::to_value(polish)?
        }
        Item::Topper(coat) | Item::Finisher(coat) => {
            let mut coat = coat.clone();
            coat.id = id;
            coat.added_at = Some(now);
            serde_json::to_value(coat)?
        }
    };
    Ok(value)
}

#[async_trait]
impl PersistenceBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn load(&mut self) -> PickerResult<AppState> {
        let Some(document) = self.documents.get(&self.uid).await? else {
            self.ensure_document().await?;
            return Ok(AppState::default());
        };

        let missing = document.missing_fields();
        if !missing.is_empty() {
            tracing::info!("Backfilling {} missing fields for {}", missing.len(), self.uid);
            if let Err(e) = self.write(missing).await {
                tracing::warn!("Failed to backfill user document: {}", e);
            }
        }

        let state = document.into_state();
        tracing::debug!(
            "Loaded remote state for {}: {} polishes, {} combinations",
            self.uid,
            state.catalog.polishes.len(),
            state.history.len()
        );
        Ok(state)
    }

    async fn item_added(&mut self, item: &Item, _state: &AppState) -> PickerResult<()> {
        self.ensure_document().await?;
        let value = stamp(item, Utc::now())?;
        self.documents
            .array_append(&self.uid, collection_field(item.category()), value)
            .await?;
        self.write(Map::new()).await
    }

    async fn item_removed(
        &mut self,
        category: ItemCategory,
        key: &ItemKey,
        _state: &AppState,
    ) -> PickerResult<()> {
        self.ensure_document().await?;
        self.rewrite_collection(category, key).await
    }

    async fn polish_updated(&mut self, key: &ItemKey, polish: &Polish, _state: &AppState) -> PickerResult<()> {
        self.ensure_document().await?;
        let mut polishes = self.current().await?.polish_collection.unwrap_or_default();

        match polishes.iter_mut().find(|p| p.has_key(&key.name, &key.brand)) {
            Some(stored) => {
                let mut updated = polish.clone();
                updated.id = updated.id.or_else(|| stored.id.take());
                updated.added_at = updated.added_at.or(stored.added_at);
                *stored = updated;
            }
            None => polishes.push(polish.clone()),
        }
        self.write_field(POLISH_COLLECTION, &polishes).await
    }

    async fn attributes_changed(&mut self, kind: AttributeKind, state: &AppState) -> PickerResult<()> {
        self.ensure_document().await?;
        self.write_field(keys::custom(kind), state.registry.customs(kind)).await
    }

    async fn combination_added(&mut self, combination: &Combination, _state: &AppState) -> PickerResult<()> {
        self.ensure_document().await?;
        let mut recent = self.current().await?.recent_combinations.unwrap_or_default();

        let mut entry = combination.clone();
        entry.created_at = Some(Utc::now());
        recent.insert(0, entry);
        if recent.len() > self.history_cap {
            tracing::debug!(
                "Dropping {} combinations beyond the remote cap",
                recent.len() - self.history_cap
            );
            recent.truncate(self.history_cap);
        }
        self.write_field(RECENT_COMBINATIONS, &recent).await
    }

    async fn combination_updated(&mut self, combination: &Combination, _state: &AppState) -> PickerResult<()> {
        self.ensure_document().await?;
        let mut recent = self.current().await?.recent_combinations.unwrap_or_default();

        let Some(stored) = recent.iter_mut().find(|c| c.id == combination.id) else {
            tracing::debug!("Combination {} is no longer stored remotely", combination.id);
            return Ok(());
        };
        let created_at = stored.created_at;
        *stored = combination.clone();
        stored.created_at = created_at.or(combination.created_at);
        self.write_field(RECENT_COMBINATIONS, &recent).await
    }

    async fn combination_removed(&mut self, removed: &Combination, _state: &AppState) -> PickerResult<()> {
        self.ensure_document().await?;
        let mut recent = self.current().await?.recent_combinations.unwrap_or_default();
        recent.retain(|c| c.id != removed.id);
        self.write_field(RECENT_COMBINATIONS, &recent).await
    }

    async fn store_media(&mut self, id: &CombinationId, upload: &MediaUpload) -> PickerResult<MediaRef> {
        let namespace = media::storage_namespace(&self.uid, upload.kind);
        let file_name = media::storage_file_name(id, upload, Utc::now());

        let stored = self
            .objects
            .upload(&namespace, &file_name, &upload.bytes, &upload.mime_type())
            .await
            .map_err(|e| match e {
                PickerError::UploadFailed(_) => e,
                other => PickerError::UploadFailed(other.to_string()),
            })?;
        tracing::info!("Uploaded {} for combination {} to {}", upload.kind, id, stored.path);

        Ok(MediaRef::Remote(RemoteMedia {
            url: stored.url,
            path: stored.path,
            file_name,
        }))
    }

    async fn release_media(&mut self, kind: MediaKind, media: &MediaRef) -> PickerResult<()> {
        match media.remote_path() {
            Some(path) => {
                tracing::debug!("Deleting {} object {}", kind, path);
                self.objects.delete(path).await
            }
            None => Ok(()),
        }
    }

    async fn replace_all(&mut self, state: &AppState) -> PickerResult<()> {
        self.ensure_document().await?;

        let mut fields = Map::new();
        fields.insert(POLISH_COLLECTION.into(), serde_json::to_value(&state.catalog.polishes)?);
        fields.insert(TOPPER_COLLECTION.into(), serde_json::to_value(&state.catalog.toppers)?);
        fields.insert(FINISHER_COLLECTION.into(), serde_json::to_value(&state.catalog.finishers)?);
        fields.insert(
            RECENT_COMBINATIONS.into(),
            serde_json::to_value(self.recent_from(&state.history))?,
        );
        for kind in AttributeKind::ALL {
            fields.insert(
                keys::custom(kind).into(),
                serde_json::to_value(state.registry.customs(kind))?,
            );
        }
        self.write(fields).await
    }

    fn history_cap(&self) -> Option<usize> {
        Some(self.history_cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Fixture {
        documents: Arc<MemoryDocumentStore>,
        objects: Arc<MemoryObjectStorage>,
        backend: RemoteBackend,
    }

    fn fixture() -> Fixture {
        let documents = Arc::new(MemoryDocumentStore::new());
        let objects = Arc::new(MemoryObjectStorage::new());
        let backend = RemoteBackend::new("u1", documents.clone(), objects.clone(), 10);
        Fixture {
            documents,
            objects,
            backend,
        }
    }

    fn combo(n: i64) -> Combination {
        let mut c = Combination::candidate(
            CombinationId::new(n.to_string()),
            Polish::new(format!("P{}", n), "B", vec!["red".into()], "creme"),
            None,
            None,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(n),
        );
        c.used = true;
        c
    }

    #[tokio::test]
    async fn test_load_creates_missing_document() {
        let mut f = fixture();
        let state = f.backend.load().await.unwrap();

        assert_eq!(state, AppState::default());
        let raw = f.documents.raw("u1").unwrap();
        assert!(raw.contains_key("polishCollection"));
        assert!(raw.contains_key("createdAt"));
    }

    #[tokio::test]
    async fn test_load_backfills_missing_fields() {
        let mut f = fixture();
        let mut raw = Map::new();
        raw.insert(
            "polishCollection".into(),
            serde_json::json!([{ "name": "A", "brand": "B", "colors": ["red"], "formula": "creme" }]),
        );
        f.documents.insert_raw("u1", raw).unwrap();

        let state = f.backend.load().await.unwrap();

        assert_eq!(state.catalog.polishes.len(), 1);
        let raw = f.documents.raw("u1").unwrap();
        assert_eq!(raw.get("customFinisherTypes"), Some(&serde_json::json!([])));
        assert_eq!(raw.get("recentCombinations"), Some(&serde_json::json!([])));
    }

    #[tokio::test]
    async fn test_item_added_is_stamped() {
        let mut f = fixture();
        let item = Item::Topper(Coat::new("Flakies", "ILNP", "glitter"));

        f.backend.item_added(&item, &AppState::default()).await.unwrap();

        let doc = f.documents.get("u1").await.unwrap().unwrap();
        let stored = &doc.topper_collection.unwrap()[0];
        assert_eq!(stored.name, "Flakies");
        assert!(stored.id.is_some());
        assert!(stored.added_at.is_some());
    }

    #[tokio::test]
    async fn test_remove_rewrites_collection() {
        let mut f = fixture();
        let state = AppState::default();
        for name in ["A", "B"] {
            let item = Item::Polish(Polish::new(name, "X", vec!["red".into()], "creme"));
            f.backend.item_added(&item, &state).await.unwrap();
        }

        f.backend
            .item_removed(ItemCategory::Polish, &ItemKey::new("A", "X"), &state)
            .await
            .unwrap();

        let doc = f.documents.get("u1").await.unwrap().unwrap();
        let names: Vec<String> = doc.polish_collection.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["B".to_string()]);
    }

    #[tokio::test]
    async fn test_recent_combinations_capped_newest_first() {
        let mut f = fixture();
        for n in 0..11 {
            f.backend.combination_added(&combo(n), &AppState::default()).await.unwrap();
        }

        let recent = f.documents.get("u1").await.unwrap().unwrap().recent_combinations.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].id.as_str(), "10");
        assert_eq!(recent[9].id.as_str(), "1");
        assert!(recent[0].created_at.is_some());

        let state = f.backend.load().await.unwrap();
        assert_eq!(state.history.entries()[0].id.as_str(), "1");
        assert_eq!(state.history.entries()[9].id.as_str(), "10");
    }

    #[tokio::test]
    async fn test_upload_and_release_media() {
        let mut f = fixture();
        let upload = MediaUpload::new(MediaKind::Photo, vec![1, 2, 3], "nails.png");

        let media = f.backend.store_media(&CombinationId::from("7"), &upload).await.unwrap();
        let path = media.remote_path().unwrap().to_string();
        assert!(path.starts_with("users/u1/combination-photos/combination_7_"));
        assert!(path.ends_with(".png"));
        assert_eq!(f.objects.paths(), vec![path]);

        f.backend.release_media(MediaKind::Photo, &media).await.unwrap();
        assert!(f.objects.paths().is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure() {
        let mut f = fixture();
        f.objects.fail_uploads(true);
        let upload = MediaUpload::new(MediaKind::Video, vec![1], "clip.mp4");

        let err = f.backend.store_media(&CombinationId::from("7"), &upload).await.unwrap_err();
        assert!(matches!(err, PickerError::UploadFailed(_)));
    }

    #[tokio::test]
    async fn test_write_failure_surfaces() {
        let mut f = fixture();
        f.backend.load().await.unwrap();
        f.documents.fail_writes(true);

        let err = f
            .backend
            .attributes_changed(AttributeKind::Color, &AppState::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PickerError::RemoteWriteFailed(_)));
    }
}
