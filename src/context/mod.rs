//! The app-wide state holder.
//!
//! [`PickerContext`] owns the in-memory state and the active persistence
//! backend. Every intent mutates memory first and then asks the backend to
//! mirror the change. Persistence failures do not undo the in-memory change:
//! they are logged and kept as [`PickerContext::last_sync_error`].

#[cfg(test)]
mod tests;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use crate::attributes::{AddOutcome, AttributeKind, AttributeRegistry};
use crate::catalog::{
    collection_stats, Catalog, CollectionStats, Item, ItemCategory, ItemKey, Keyed, Polish,
    PolishQuery,
};
use crate::config::CoreConfig;
use crate::error::{PickerError, PickerResult};
use crate::history::{
    Combination, CombinationId, CombinationPatch, History, HistoryQuery, IdGenerator, MediaRef,
};
use crate::media::{self, MediaKind, MediaUpload};
use crate::persistence::{
    AppState, DocumentStore, LocalBackend, LocalStore, MemoryDocumentStore, MemoryLocalStore,
    MemoryObjectStorage, ObjectStorage, PersistenceBackend, RemoteBackend, Snapshot, UserIdentity,
    UserSession,
};
use crate::selector::{self, PickFilters, PickOutcome};

/// Storage collaborators the context can switch between.
#[derive(Clone)]
pub struct Stores {
    pub local: Arc<dyn LocalStore>,
    pub documents: Option<Arc<dyn DocumentStore>>,
    pub objects: Option<Arc<dyn ObjectStorage>>,
}

impl Stores {
    /// Local storage only. Signing in fails until remote stores are added.
    pub fn local(local: Arc<dyn LocalStore>) -> Self {
        Self {
            local,
            documents: None,
            objects: None,
        }
    }

    pub fn with_remote(mut self, documents: Arc<dyn DocumentStore>, objects: Arc<dyn ObjectStorage>) -> Self {
        self.documents = Some(documents);
        self.objects = Some(objects);
        self
    }

    /// Fresh in-process stores for every role.
    pub fn in_memory() -> Self {
        Self::local(Arc::new(MemoryLocalStore::new())).with_remote(
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(MemoryObjectStorage::new()),
        )
    }
}

pub struct PickerContext {
    state: AppState,
    session: UserSession,
    backend: Box<dyn PersistenceBackend>,
    stores: Stores,
    config: CoreConfig,
    ids: IdGenerator,
    rng: StdRng,
    last_sync_error: Option<PickerError>,
}

impl PickerContext {
    /// Start an anonymous session and load the local store.
    pub async fn open(config: CoreConfig, stores: Stores) -> PickerResult<Self> {
        let backend = Box::new(LocalBackend::new(stores.local.clone()));
        let mut context = Self {
            state: AppState::default(),
            session: UserSession::Anonymous,
            backend,
            stores,
            config,
            ids: IdGenerator::new(),
            rng: StdRng::from_entropy(),
            last_sync_error: None,
        };
        context.reload().await?;
        Ok(context)
    }

    /// Use a deterministic random source for picks.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// React to the auth provider.
    ///
    /// Switching between anonymous and a user, or between users, replaces
    /// memory with everything from the newly active backend. Data is never
    /// merged across backends. The same uid again only refreshes the identity
    /// details.
    ///
    /// The new backend is only installed once its state has loaded. If the
    /// load fails, the previous session, backend and memory stay in place so
    /// nothing unloaded is ever written over the user's stored data.
    pub async fn on_session_changed(&mut self, identity: Option<UserIdentity>) -> PickerResult<()> {
        let session = UserSession::from_identity(identity);
        if session.uid() == self.session.uid() {
            self.session = session;
            return Ok(());
        }

        let mut backend = self.backend_for(&session)?;
        tracing::info!(
            "Session changed ({} -> {}), loading {} state",
            self.session.uid().unwrap_or("anonymous"),
            session.uid().unwrap_or("anonymous"),
            backend.name()
        );

        let state = match backend.load().await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(
                    "Failed to load {} state, keeping the current session: {}",
                    backend.name(),
                    e
                );
                return Err(e);
            }
        };

        self.backend = backend;
        self.session = session;
        self.state = state;
        self.last_sync_error = None;
        Ok(())
    }

    fn backend_for(&self, session: &UserSession) -> PickerResult<Box<dyn PersistenceBackend>> {
        match session {
            UserSession::Anonymous => Ok(Box::new(LocalBackend::new(self.stores.local.clone()))),
            UserSession::Authenticated(user) => {
                let (Some(documents), Some(objects)) = (&self.stores.documents, &self.stores.objects)
                else {
                    return Err(PickerError::RemoteReadFailed(
                        "no remote store configured".to_string(),
                    ));
                };
                Ok(Box::new(RemoteBackend::new(
                    user.uid.clone(),
                    documents.clone(),
                    objects.clone(),
                    self.config.remote_history_cap,
                )))
            }
        }
    }

    /// Replace memory with the active backend's state.
    async fn reload(&mut self) -> PickerResult<()> {
        match self.backend.load().await {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load {} state: {}", self.backend.name(), e);
                Err(e)
            }
        }
    }

    /// Log and keep a failed backend write. Memory is not rolled back.
    fn record_sync(&mut self, operation: &str, result: PickerResult<()>) {
        if let Err(e) = result {
            tracing::error!(
                "Failed to persist {} to {} storage: {}",
                operation,
                self.backend.name(),
                e
            );
            self.last_sync_error = Some(e);
        }
    }

    async fn release_media(&mut self, kind: MediaKind, media: &MediaRef) {
        if let Err(e) = self.backend.release_media(kind, media).await {
            tracing::warn!("Failed to release {}: {}", kind, e);
        }
    }

    fn remember_inline(&mut self, id: &CombinationId, kind: MediaKind, media: &MediaRef) {
        let key = media::media_map_key(id, kind);
        match media {
            MediaRef::Inline(uri) => {
                self.state.media.insert(key, uri.clone());
            }
            MediaRef::Remote(_) => {
                self.state.media.remove(&key);
            }
        }
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    pub async fn add_item(&mut self, item: Item) -> PickerResult<Item> {
        let stored = self.state.catalog.add(item)?;
        let result = self.backend.item_added(&stored, &self.state).await;
        self.record_sync("new item", result);
        Ok(stored)
    }

    pub async fn remove_item(&mut self, category: ItemCategory, name: &str, brand: &str) -> PickerResult<Item> {
        let removed = self.state.catalog.remove(category, name, brand)?;
        let key = ItemKey::new(removed.name(), removed.brand());
        let result = self.backend.item_removed(category, &key, &self.state).await;
        self.record_sync("item removal", result);
        Ok(removed)
    }

    pub async fn update_polish(&mut self, key: &ItemKey, patched: Polish) -> PickerResult<Polish> {
        let updated = self.state.catalog.update_polish(key, patched)?;
        let result = self.backend.polish_updated(key, &updated, &self.state).await;
        self.record_sync("polish edit", result);
        Ok(updated)
    }

    /// Matching polishes sorted by brand then name.
    pub fn query_polishes(&self, query: &PolishQuery) -> Vec<&Polish> {
        query.apply(&self.state.catalog.polishes)
    }

    pub fn stats(&self) -> CollectionStats {
        collection_stats(&self.state.catalog, self.state.history.entries())
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn attribute_values(&self, kind: AttributeKind) -> Vec<String> {
        self.state.registry.all_values(kind, &self.state.catalog)
    }

    pub async fn add_custom(&mut self, kind: AttributeKind, value: &str) -> PickerResult<AddOutcome> {
        let outcome = self.state.registry.add_custom(kind, value, &self.state.catalog)?;
        if outcome == AddOutcome::Added {
            let result = self.backend.attributes_changed(kind, &self.state).await;
            self.record_sync("custom value", result);
        }
        Ok(outcome)
    }

    pub async fn remove_custom(&mut self, kind: AttributeKind, value: &str) -> PickerResult<String> {
        let removed = self.state.registry.remove_custom(kind, value)?;
        let result = self.backend.attributes_changed(kind, &self.state).await;
        self.record_sync("custom value removal", result);
        Ok(removed)
    }

    // ========================================================================
    // Picking and history
    // ========================================================================

    /// Draw a candidate. Nothing is stored until [`confirm`](Self::confirm).
    pub fn pick(&mut self, filters: &PickFilters) -> PickerResult<PickOutcome> {
        let now = Utc::now();
        let id = self.ids.next_id(now);
        selector::pick(
            &self.state.catalog,
            &self.state.history,
            filters,
            id,
            now,
            &mut self.rng,
        )
    }

    pub fn add_topper(&mut self, candidate: Combination) -> PickerResult<PickOutcome> {
        selector::add_topper(&self.state.catalog, &self.state.history, candidate, &mut self.rng)
    }

    /// Record a candidate as worn.
    ///
    /// Confirming an id that is already in the history returns the stored
    /// entry without writing.
    pub async fn confirm(&mut self, candidate: Combination) -> PickerResult<Combination> {
        if let Some(existing) = self.state.history.get(&candidate.id) {
            return Ok(existing.clone());
        }

        let mut combination = candidate;
        combination.used = true;
        self.state.history.add(combination.clone());

        let evicted = match self.backend.history_cap() {
            Some(cap) => self.state.history.truncate_oldest(cap),
            None => Vec::new(),
        };
        for entry in &evicted {
            for kind in MediaKind::ALL {
                self.state.media.remove(&media::media_map_key(&entry.id, kind));
            }
        }

        let result = self.backend.combination_added(&combination, &self.state).await;
        self.record_sync("combination", result);

        if !evicted.is_empty() {
            tracing::debug!("Evicted {} combinations beyond the history cap", evicted.len());
        }
        for entry in &evicted {
            for kind in MediaKind::ALL {
                if let Some(media) = entry.media(kind) {
                    self.release_media(kind, media).await;
                }
            }
        }
        Ok(combination)
    }

    /// Store media first, then confirm with it linked.
    ///
    /// If storing fails the candidate stays unconfirmed so the caller can
    /// retry.
    pub async fn confirm_with_media(
        &mut self,
        candidate: Combination,
        upload: MediaUpload,
    ) -> PickerResult<Combination> {
        media::validate_size(&upload, &self.config.media)?;

        if self.state.history.get(&candidate.id).is_some() {
            self.attach_media(&candidate.id, upload).await?;
            return self
                .state
                .history
                .get(&candidate.id)
                .cloned()
                .ok_or_else(|| PickerError::NotFound(format!("combination {}", candidate.id)));
        }

        let stored = self.backend.store_media(&candidate.id, &upload).await?;
        let mut candidate = candidate;
        match upload.kind {
            MediaKind::Photo => candidate.photo = Some(stored.clone()),
            MediaKind::Video => candidate.video = Some(stored.clone()),
        }
        self.remember_inline(&candidate.id, upload.kind, &stored);
        self.confirm(candidate).await
    }

    pub async fn update_combination(
        &mut self,
        id: &CombinationId,
        patch: CombinationPatch,
    ) -> PickerResult<Combination> {
        let updated = self.state.history.update(id, patch)?.clone();
        let result = self.backend.combination_updated(&updated, &self.state).await;
        self.record_sync("combination update", result);
        Ok(updated)
    }

    /// Remove a history entry. Its media is released best-effort.
    pub async fn delete_combination(&mut self, id: &CombinationId) -> PickerResult<Combination> {
        let removed = self.state.history.remove(id)?;
        for kind in MediaKind::ALL {
            self.state.media.remove(&media::media_map_key(id, kind));
        }

        let result = self.backend.combination_removed(&removed, &self.state).await;
        self.record_sync("combination removal", result);

        for kind in MediaKind::ALL {
            if let Some(media) = removed.media(kind) {
                self.release_media(kind, media).await;
            }
        }
        Ok(removed)
    }

    pub fn query_history(&self, query: &HistoryQuery) -> Vec<&Combination> {
        self.state.history.query(query)
    }

    // ========================================================================
    // Media
    // ========================================================================

    /// Attach a photo or video to a confirmed combination, replacing any
    /// previous one of the same kind.
    ///
    /// Size is checked before anything else. A failed upload leaves the
    /// entry untouched.
    pub async fn attach_media(&mut self, id: &CombinationId, upload: MediaUpload) -> PickerResult<MediaRef> {
        media::validate_size(&upload, &self.config.media)?;
        let kind = upload.kind;
        let previous = self
            .state
            .history
            .get(id)
            .ok_or_else(|| PickerError::NotFound(format!("combination {}", id)))?
            .media(kind)
            .cloned();

        let stored = self.backend.store_media(id, &upload).await?;
        let updated = self
            .state
            .history
            .update(id, CombinationPatch::media(kind, Some(stored.clone())))?
            .clone();
        self.remember_inline(id, kind, &stored);

        let result = self.backend.combination_updated(&updated, &self.state).await;
        self.record_sync("media link", result);

        if let Some(old) = previous.filter(|old| old != &stored) {
            self.release_media(kind, &old).await;
        }
        Ok(stored)
    }

    /// Unlink media from a combination and release it best-effort.
    pub async fn detach_media(&mut self, id: &CombinationId, kind: MediaKind) -> PickerResult<()> {
        let previous = self
            .state
            .history
            .get(id)
            .ok_or_else(|| PickerError::NotFound(format!("combination {}", id)))?
            .media(kind)
            .cloned();
        let updated = self
            .state
            .history
            .update(id, CombinationPatch::media(kind, None))?
            .clone();
        self.state.media.remove(&media::media_map_key(id, kind));

        let result = self.backend.combination_updated(&updated, &self.state).await;
        self.record_sync("media unlink", result);

        if let Some(old) = previous {
            self.release_media(kind, &old).await;
        }
        Ok(())
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    pub fn export(&self) -> Snapshot {
        Snapshot::capture(&self.state, Utc::now())
    }

    pub fn export_json(&self) -> PickerResult<String> {
        self.export().to_json_pretty()
    }

    /// Replace the collections present in `json`. A malformed file changes
    /// nothing.
    pub async fn import_json(&mut self, json: &str) -> PickerResult<()> {
        let snapshot = Snapshot::parse(json)?;
        snapshot.apply_to(&mut self.state);
        if let Some(cap) = self.backend.history_cap() {
            self.state.history.truncate_oldest(cap);
        }

        let result = self.backend.replace_all(&self.state).await;
        self.record_sync("import", result);
        Ok(())
    }

    /// Clear every collection in memory and in the active backend.
    pub async fn reset_all(&mut self) {
        self.state = AppState::default();
        let result = self.backend.replace_all(&self.state).await;
        self.record_sync("reset", result);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.state.catalog
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.state.registry
    }

    pub fn history(&self) -> &History {
        &self.state.history
    }

    pub fn session(&self) -> &UserSession {
        &self.session
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Most recent persistence failure, if any.
    pub fn last_sync_error(&self) -> Option<&PickerError> {
        self.last_sync_error.as_ref()
    }

    pub fn clear_sync_error(&mut self) {
        self.last_sync_error = None;
    }
}
