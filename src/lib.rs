//! Polish Picker Core Library
//!
//! Core logic for a personal nail polish catalog and randomizer:
//! - **catalog**: polishes, toppers and finishers keyed by (name, brand)
//! - **attributes**: built-in and custom colors, formulas, types, brands, collections
//! - **selector**: filtered random pick of a polish/topper/finisher combination
//! - **history**: confirmed combinations with photo/video attachments
//! - **persistence**: local device store or per-user remote document, chosen by session
//! - **media**: size checks, inline encoding and storage naming for attachments
//! - **context**: [`PickerContext`], the single owner of app state
//!
//! The stateless `*_json` functions accept and return JSON so every platform
//! binding (browser, iOS, Android) can share them.
//!
//! # Example (conceptual)
//! ```ignore
//! let stores = Stores::in_memory();
//! let mut ctx = PickerContext::open(CoreConfig::default(), stores).await?;
//!
//! ctx.add_item(Item::Polish(Polish::new("Lincoln Park After Dark", "OPI", vec!["purple".into()], "creme"))).await?;
//! ctx.add_item(Item::Finisher(Coat::new("Seche Vite", "Seche", "glossy"))).await?;
//!
//! let outcome = ctx.pick(&PickFilters::default())?;
//! let worn = ctx.confirm(outcome.candidate).await?;
//! ```

pub mod attributes;
pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod history;
pub mod media;
pub mod persistence;
pub mod selector;

pub use attributes::{attribute_values_json, AddOutcome, AttributeKind, AttributeRegistry};
pub use catalog::{
    collection_stats, collection_stats_json, Catalog, Coat, CollectionStats, Finisher, Item,
    ItemCategory, ItemKey, Keyed, Polish, PolishQuery, TokenCount, Topper,
};
pub use config::{CoreConfig, MediaLimits};
pub use context::{PickerContext, Stores};
pub use error::{PickerError, PickerResult};
pub use history::{
    query_history_json, Combination, CombinationId, CombinationPatch, History, HistoryQuery,
    MediaRef, RemoteMedia,
};
pub use media::{MediaKind, MediaUpload};
pub use persistence::{
    validate_import_json, AppState, DocumentStore, LocalStore, MemoryDocumentStore,
    MemoryLocalStore, MemoryObjectStorage, ObjectStorage, PersistenceBackend, Snapshot,
    UserDocument, UserIdentity, UserSession,
};
pub use selector::{pick_json, PickFilters, PickOutcome};

/// Version of the core library.
pub fn get_core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// WASM bindings
#[cfg(feature = "wasm")]
pub mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::*;

// UniFFI bindings for Swift/Kotlin
#[cfg(feature = "uniffi")]
pub mod uniffi_api;

#[cfg(feature = "uniffi")]
pub use uniffi_api::*;

// UniFFI scaffolding - generates the FFI glue code
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
