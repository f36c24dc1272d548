use serde::{Deserialize, Serialize};

use crate::media::{MediaItem, StreamingCard};

/// One filesystem view in gigabytes: either the combined mount points or
/// the dedicated archive drive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageInfo {
    pub total: f64,
    pub used: f64,
    pub available: f64,
}

impl StorageInfo {
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

    pub fn from_bytes(total: u64, used: u64, available: u64) -> Self {
        Self {
            total: total as f64 / Self::GIB,
            used: used as f64 / Self::GIB,
            available: available as f64 / Self::GIB,
        }
    }
}

/// Per-library summary counts shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    pub tv: u64,
    pub tv_size: f64,
    pub tv_episodes: u64,
    pub movies: u64,
    pub movies_size: f64,
    /// Number of snapshot items currently on any preferred streaming service.
    pub on_streaming: u64,
}

/// Largest ended shows and streaming-flagged movies, surfaced as suggested
/// next actions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedActions {
    pub ended_shows: Vec<MediaItem>,
    pub streaming_movies: Vec<MediaItem>,
}

/// The pre-computed dashboard aggregate published to the cache under a
/// single well-known key at the end of every successful sync pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub storage_data: StorageInfo,
    pub archive_data: StorageInfo,
    /// Sum of `size` over all candidate-status items, rounded to 2 dp.
    pub potential_savings: f64,
    pub candidates: Vec<MediaItem>,
    /// Top movies by size, excluding already-archived ones.
    pub large_movies: Vec<MediaItem>,
    /// All items with a non-empty overall provider result, size descending.
    pub streaming_highlights: Vec<StreamingCard>,
    pub library_stats: LibraryStats,
    pub recommended_actions: RecommendedActions,
}
