//! Runtime configuration for the core.

use serde::{Deserialize, Serialize};

use crate::error::PickerResult;

const MIB: u64 = 1024 * 1024;

/// Size limits for attached media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaLimits {
    /// Maximum photo size in bytes (default: 5 MiB)
    pub photo_max_bytes: u64,
    /// Maximum video size in bytes (default: 5 MiB)
    pub video_max_bytes: u64,
}

impl Default for MediaLimits {
    fn default() -> Self {
        Self {
            photo_max_bytes: 5 * MIB,
            video_max_bytes: 5 * MIB,
        }
    }
}

/// Core configuration.
///
/// Every field has a default, so `{}` is a valid configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    /// Media size limits
    pub media: MediaLimits,
    /// Number of combinations kept in the remote `recentCombinations` array.
    /// The local store keeps every combination.
    pub remote_history_cap: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            media: MediaLimits::default(),
            remote_history_cap: 10,
        }
    }
}

impl CoreConfig {
    /// Parse a configuration from JSON, filling absent fields with defaults.
    pub fn from_json(json: &str) -> PickerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
