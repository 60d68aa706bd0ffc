//! Combination records and their media references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::catalog::{Coat, Keyed, Polish};
use crate::media::MediaKind;

/// Opaque combination id.
///
/// Stored as a string; older local data wrote it as a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CombinationId(String);

impl CombinationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CombinationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for CombinationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => CombinationId(n.to_string()),
            RawId::Text(s) => CombinationId(s),
        })
    }
}

/// Hands out ids derived from the creation timestamp in milliseconds.
///
/// Two ids requested within the same millisecond are still distinct: the
/// generator never returns a value lower than or equal to the previous one.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, now: DateTime<Utc>) -> CombinationId {
        let millis = now.timestamp_millis().max(self.last + 1);
        self.last = millis;
        CombinationId(millis.to_string())
    }
}

/// Photo or video attached to a combination.
///
/// Local sessions keep the media inline as a data URI; remote sessions keep
/// a reference to the uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaRef {
    Remote(RemoteMedia),
    Inline(String),
}

impl MediaRef {
    pub fn is_remote(&self) -> bool {
        matches!(self, MediaRef::Remote(_))
    }

    /// Storage path of a remote object.
    pub fn remote_path(&self) -> Option<&str> {
        match self {
            MediaRef::Remote(remote) => Some(&remote.path),
            MediaRef::Inline(_) => None,
        }
    }
}

/// An uploaded media object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMedia {
    pub url: String,
    pub path: String,
    pub file_name: String,
}

/// One polish (+ topper) (+ finisher) pairing.
///
/// Items are embedded by value so the entry stays stable after the catalog
/// item is edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combination {
    pub id: CombinationId,
    pub polish: Polish,
    #[serde(default)]
    pub topper: Option<Coat>,
    #[serde(default)]
    pub finisher: Option<Coat>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<MediaRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<MediaRef>,
    /// Set when the entry is written to the remote document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Combination {
    /// A fresh candidate: not used, no media.
    pub fn candidate(
        id: CombinationId,
        polish: Polish,
        topper: Option<Coat>,
        finisher: Option<Coat>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            polish,
            topper,
            finisher,
            date,
            used: false,
            photo: None,
            video: None,
            created_at: None,
        }
    }

    /// Same polish (name, brand) and same topper: both absent, or both
    /// present with equal (name, brand).
    pub fn same_pairing(&self, polish: &Polish, topper: Option<&Coat>) -> bool {
        if !self.polish.has_key(&polish.name, &polish.brand) {
            return false;
        }
        match (&self.topper, topper) {
            (None, None) => true,
            (Some(mine), Some(theirs)) => mine.has_key(&theirs.name, &theirs.brand),
            _ => false,
        }
    }

    pub fn media(&self, kind: MediaKind) -> Option<&MediaRef> {
        match kind {
            MediaKind::Photo => self.photo.as_ref(),
            MediaKind::Video => self.video.as_ref(),
        }
    }
}
