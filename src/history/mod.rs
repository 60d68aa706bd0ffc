//! Combination history.
//!
//! An ordered list of confirmed combinations. Entries are appended in the
//! order they were confirmed; display order (newest first) is derived.

mod combination;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Coat, Polish};
use crate::error::{PickerError, PickerResult};
use crate::media::MediaKind;
pub use combination::{Combination, CombinationId, IdGenerator, MediaRef, RemoteMedia};

/// Shallow update for a history entry. `Some(None)` clears a media field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinationPatch {
    pub used: Option<bool>,
    pub date: Option<DateTime<Utc>>,
    pub photo: Option<Option<MediaRef>>,
    pub video: Option<Option<MediaRef>>,
}

impl CombinationPatch {
    pub fn photo(photo: Option<MediaRef>) -> Self {
        Self {
            photo: Some(photo),
            ..Self::default()
        }
    }

    pub fn video(video: Option<MediaRef>) -> Self {
        Self {
            video: Some(video),
            ..Self::default()
        }
    }

    pub fn media(kind: MediaKind, media: Option<MediaRef>) -> Self {
        match kind {
            MediaKind::Photo => Self::photo(media),
            MediaKind::Video => Self::video(media),
        }
    }

    fn apply(self, entry: &mut Combination) {
        if let Some(used) = self.used {
            entry.used = used;
        }
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(photo) = self.photo {
            entry.photo = photo;
        }
        if let Some(video) = self.video {
            entry.video = video;
        }
    }
}

/// Display filter for the history view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryQuery {
    /// Case-insensitive substring across item names, brands, formulas,
    /// colors, types and collections
    pub text: Option<String>,
    /// `Some(true)` keeps entries with a photo, `Some(false)` those without
    pub has_photo: Option<bool>,
    pub has_video: Option<bool>,
}

impl HistoryQuery {
    pub fn matches(&self, entry: &Combination) -> bool {
        if let Some(want) = self.has_photo {
            if entry.photo.is_some() != want {
                return false;
            }
        }
        if let Some(want) = self.has_video {
            if entry.video.is_some() != want {
                return false;
            }
        }

        let needle = match self.text.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_lowercase(),
            _ => return true,
        };
        searchable_fields(entry).any(|field| field.to_lowercase().contains(&needle))
    }
}

fn searchable_fields(entry: &Combination) -> impl Iterator<Item = &str> {
    let polish = &entry.polish;
    let polish_fields = [polish.name.as_str(), polish.brand.as_str(), polish.formula.as_str()]
        .into_iter()
        .chain(polish.colors.iter().map(String::as_str))
        .chain(polish.collection.as_deref());

    let coat_fields = entry
        .topper
        .iter()
        .chain(entry.finisher.iter())
        .flat_map(|coat| {
            [coat.name.as_str(), coat.brand.as_str(), coat.kind.as_str()]
                .into_iter()
                .chain(coat.collection.as_deref())
        });

    polish_fields.chain(coat_fields)
}

/// The ordered record of confirmed combinations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<Combination>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<Combination>) -> Self {
        Self { entries }
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[Combination] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &CombinationId) -> Option<&Combination> {
        self.entries.iter().find(|c| &c.id == id)
    }

    pub fn add(&mut self, combination: Combination) {
        self.entries.push(combination);
    }

    /// Merge `patch` into the entry with `id` and return the updated entry.
    pub fn update(&mut self, id: &CombinationId, patch: CombinationPatch) -> PickerResult<&Combination> {
        let entry = self
            .entries
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| PickerError::NotFound(format!("combination {}", id)))?;
        patch.apply(entry);
        Ok(entry)
    }

    /// Remove and return the entry with `id`.
    pub fn remove(&mut self, id: &CombinationId) -> PickerResult<Combination> {
        let index = self
            .entries
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| PickerError::NotFound(format!("combination {}", id)))?;
        Ok(self.entries.remove(index))
    }

    /// Drop the oldest-added entries beyond `cap` and return them.
    pub fn truncate_oldest(&mut self, cap: usize) -> Vec<Combination> {
        let excess = self.entries.len().saturating_sub(cap);
        self.entries.drain(..excess).collect()
    }

    /// Most recent confirmed entry with the same polish/topper pairing.
    pub fn previous_use(&self, polish: &Polish, topper: Option<&Coat>) -> Option<&Combination> {
        self.entries
            .iter()
            .rev()
            .find(|c| c.used && c.same_pairing(polish, topper))
    }

    /// All entries, newest date first.
    pub fn newest_first(&self) -> Vec<&Combination> {
        self.query(&HistoryQuery::default())
    }

    /// Matching entries, newest date first.
    pub fn query(&self, query: &HistoryQuery) -> Vec<&Combination> {
        let mut matched: Vec<&Combination> =
            self.entries.iter().filter(|c| query.matches(c)).collect();
        matched.sort_by(|a, b| b.date.cmp(&a.date));
        matched
    }
}

#[derive(Debug, Clone, Deserialize)]
struct HistoryQueryInput {
    combinations: Vec<Combination>,
    #[serde(default)]
    query: HistoryQuery,
}

/// Query history from JSON input `{"combinations": [...], "query": {...}}`.
/// Returns the matching combinations, newest first.
/// Convenience function for FFI.
pub fn query_history_json(input_json: &str) -> PickerResult<String> {
    let input: HistoryQueryInput = serde_json::from_str(input_json)?;
    let history = History::from_entries(input.combinations);
    let matched = history.query(&input.query);
    Ok(serde_json::to_string(&matched)?)
}
