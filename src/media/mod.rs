//! Media attachment helpers: size validation, inline encoding and naming of
//! uploaded objects.
//!
//! Where the bytes end up is decided by the active
//! [`PersistenceBackend`](crate::persistence::PersistenceBackend): the local
//! backend keeps a data URI, the remote backend uploads to object storage.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::MediaLimits;
use crate::error::{PickerError, PickerResult};
use crate::history::CombinationId;

/// Photo or video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Photo, MediaKind::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }

    pub fn max_bytes(&self, limits: &MediaLimits) -> u64 {
        match self {
            MediaKind::Photo => limits.photo_max_bytes,
            MediaKind::Video => limits.video_max_bytes,
        }
    }

    /// Folder under the user's storage namespace.
    pub fn storage_folder(&self) -> &'static str {
        match self {
            MediaKind::Photo => "combination-photos",
            MediaKind::Video => "combination-videos",
        }
    }

    fn default_extension(&self) -> &'static str {
        match self {
            MediaKind::Photo => "jpg",
            MediaKind::Video => "mp4",
        }
    }

    fn default_mime(&self) -> &'static str {
        match self {
            MediaKind::Photo => "image/jpeg",
            MediaKind::Video => "video/mp4",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "photo" | "image" => Ok(MediaKind::Photo),
            "video" => Ok(MediaKind::Video),
            _ => Err(PickerError::InvalidCategory(s.to_string())),
        }
    }
}

/// Media picked by the user, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub kind: MediaKind,
    pub bytes: Vec<u8>,
    /// Original file name, used for the extension
    pub file_name: String,
    pub mime_type: Option<String>,
}

impl MediaUpload {
    pub fn new(kind: MediaKind, bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            kind,
            bytes,
            file_name: file_name.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| self.kind.default_extension().to_string())
    }

    pub fn mime_type(&self) -> String {
        if let Some(mime) = self.mime_type.as_deref().filter(|m| !m.is_empty()) {
            return mime.to_string();
        }
        match self.extension().as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "heic" => "image/heic",
            "mp4" => "video/mp4",
            "mov" => "video/quicktime",
            "webm" => "video/webm",
            _ => self.kind.default_mime(),
        }
        .to_string()
    }
}

/// Reject media over the configured limit for its kind.
pub fn validate_size(upload: &MediaUpload, limits: &MediaLimits) -> PickerResult<()> {
    check_size(upload.kind, upload.bytes.len() as u64, limits)
}

/// Size check on a byte count alone, before any bytes are read.
pub fn check_size(kind: MediaKind, size: u64, limits: &MediaLimits) -> PickerResult<()> {
    let limit = kind.max_bytes(limits);
    if size > limit {
        return Err(PickerError::FileTooLarge {
            kind: kind.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

/// Encode media as a `data:` URI for inline storage.
pub fn data_uri(upload: &MediaUpload) -> String {
    format!("data:{};base64,{}", upload.mime_type(), STANDARD.encode(&upload.bytes))
}

/// Collision-resistant object name: `combination_{id}_{millis}.{ext}`.
pub fn storage_file_name(id: &CombinationId, upload: &MediaUpload, now: DateTime<Utc>) -> String {
    format!(
        "combination_{}_{}.{}",
        id,
        now.timestamp_millis(),
        upload.extension()
    )
}

/// Storage namespace for a user's media of one kind.
pub fn storage_namespace(uid: &str, kind: MediaKind) -> String {
    format!("users/{}/{}", uid, kind.storage_folder())
}

/// Key in the local media map. Photos use the bare combination id.
pub fn media_map_key(id: &CombinationId, kind: MediaKind) -> String {
    match kind {
        MediaKind::Photo => id.to_string(),
        MediaKind::Video => format!("{}:video", id),
    }
}
