//! Persistence backends.
//!
//! The in-memory [`AppState`] is the source of truth while the app runs.
//! After every mutation the active [`PersistenceBackend`] mirrors the change:
//! - [`LocalBackend`]: device key-value store, one key per top-level collection
//! - [`RemoteBackend`]: one document per user plus object storage for media
//!
//! Backends are selected by session and swapped wholesale; business logic
//! never checks which one is active.

mod local;
mod remote;
mod snapshot;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::attributes::{AttributeKind, AttributeRegistry};
use crate::catalog::{Catalog, Item, ItemCategory, ItemKey, Polish};
use crate::error::PickerResult;
use crate::history::{Combination, CombinationId, History, MediaRef};
use crate::media::{MediaKind, MediaUpload};

pub use local::{keys, LocalBackend, LocalStore, MemoryLocalStore};
pub use remote::{
    DocumentStore, MemoryDocumentStore, MemoryObjectStorage, ObjectStorage, RemoteBackend,
    StoredObject, UserDocument,
};
pub use snapshot::{export_file_name, validate_import_json, Snapshot};

/// Everything the app holds in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub catalog: Catalog,
    pub registry: AttributeRegistry,
    pub history: History,
    /// Inline media for local sessions, keyed by
    /// [`media_map_key`](crate::media::media_map_key)
    pub media: BTreeMap<String, String>,
}

/// Who is using the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct UserIdentity {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserIdentity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UserSession {
    #[default]
    Anonymous,
    Authenticated(UserIdentity),
}

impl UserSession {
    pub fn from_identity(identity: Option<UserIdentity>) -> Self {
        match identity {
            Some(user) => UserSession::Authenticated(user),
            None => UserSession::Anonymous,
        }
    }

    pub fn uid(&self) -> Option<&str> {
        match self {
            UserSession::Anonymous => None,
            UserSession::Authenticated(user) => Some(&user.uid),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, UserSession::Authenticated(_))
    }
}

/// Mirrors in-memory mutations to durable storage.
///
/// Every write hook is called after the in-memory state was changed and
/// receives the post-mutation state. Hooks must not assume they are called
/// for every mutation in order: a failed write is logged by the caller and
/// never retried.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Read the full state from storage.
    async fn load(&mut self) -> PickerResult<AppState>;

    async fn item_added(&mut self, item: &Item, state: &AppState) -> PickerResult<()>;

    async fn item_removed(
        &mut self,
        category: ItemCategory,
        key: &ItemKey,
        state: &AppState,
    ) -> PickerResult<()>;

    /// `key` is the polish's key before the edit.
    async fn polish_updated(&mut self, key: &ItemKey, polish: &Polish, state: &AppState) -> PickerResult<()>;

    async fn attributes_changed(&mut self, kind: AttributeKind, state: &AppState) -> PickerResult<()>;

    async fn combination_added(&mut self, combination: &Combination, state: &AppState) -> PickerResult<()>;

    async fn combination_updated(&mut self, combination: &Combination, state: &AppState) -> PickerResult<()>;

    async fn combination_removed(&mut self, removed: &Combination, state: &AppState) -> PickerResult<()>;

    /// Persist media bytes and return the reference to link into the
    /// combination. Nothing is written to the combination itself.
    async fn store_media(&mut self, id: &CombinationId, upload: &MediaUpload) -> PickerResult<MediaRef>;

    /// Release stored media. Callers treat failures as best-effort.
    async fn release_media(&mut self, kind: MediaKind, media: &MediaRef) -> PickerResult<()>;

    /// Overwrite everything in storage with `state`.
    async fn replace_all(&mut self, state: &AppState) -> PickerResult<()>;

    /// Maximum number of combinations kept by this backend, if bounded.
    fn history_cap(&self) -> Option<usize> {
        None
    }
}
