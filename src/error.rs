//! Error types for the Polish Picker core library.

use thiserror::Error;

/// Errors that can occur during catalog, picking and persistence operations.
///
/// This enum is exposed to Swift/Kotlin via UniFFI as a flat error type,
/// meaning the error variants are exposed as simple enum cases with string messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
#[cfg_attr(feature = "uniffi", uniffi(flat_error))]
pub enum PickerError {
    /// An item with the same (name, brand) already exists in the category
    #[error("{category} \"{name}\" by {brand} is already in your collection")]
    DuplicateItem {
        category: String,
        name: String,
        brand: String,
    },

    /// No item, custom value or combination matched the given key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unknown item or attribute category
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// A required field was empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The polish catalog is empty
    #[error("No polishes in the collection")]
    EmptyCatalog,

    /// No polish matched the color/formula filters
    #[error("No polishes match the selected filters")]
    NoMatch,

    /// The finisher catalog is empty
    #[error("No finishers in the collection")]
    NoFinishers,

    /// No finisher matched the finisher type filter
    #[error("No finishers match the selected finisher type")]
    NoMatchingFinisher,

    /// The topper catalog is empty
    #[error("No toppers in the collection")]
    NoToppers,

    /// Media exceeded the configured size limit
    #[error("{kind} is {size} bytes, limit is {limit} bytes")]
    FileTooLarge {
        kind: String,
        size: u64,
        limit: u64,
    },

    /// Remote object upload failed
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Remote document write failed
    #[error("Remote write failed: {0}")]
    RemoteWriteFailed(String),

    /// Remote document read failed
    #[error("Remote read failed: {0}")]
    RemoteReadFailed(String),

    /// Local device store write failed
    #[error("Local store write failed: {0}")]
    LocalStoreFailed(String),

    /// Imported snapshot was malformed
    #[error("Invalid import format: {0}")]
    ImportFormatInvalid(String),

    /// Error serializing/deserializing JSON
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl From<serde_json::Error> for PickerError {
    fn from(err: serde_json::Error) -> Self {
        PickerError::JsonError(err.to_string())
    }
}

/// Result type alias for core operations.
pub type PickerResult<T> = Result<T, PickerError>;
