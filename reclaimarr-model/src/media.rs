use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rules::RetentionRule;

/// Media category, used to pick the matching library manager and archive
/// allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Tv,
    Movie,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Tv => write!(f, "tv"),
            MediaType::Movie => write!(f, "movie"),
        }
    }
}

/// Type-specific payload carried alongside the shared [`MediaItem`] fields.
///
/// Serialized with an internal `type` tag so the wire shape matches the
/// frontend contract (`"type": "tv"` / `"type": "movie"` plus the variant
/// fields inline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaKind {
    Tv {
        #[serde(default)]
        seasons: u32,
        #[serde(default)]
        episodes: u32,
        #[serde(default, rename = "sonarrId")]
        sonarr_id: Option<i64>,
    },
    Movie {
        #[serde(default)]
        year: Option<i32>,
        #[serde(default, rename = "radarrId")]
        radarr_id: Option<i64>,
    },
}

impl MediaKind {
    pub fn media_type(&self) -> MediaType {
        match self {
            MediaKind::Tv { .. } => MediaType::Tv,
            MediaKind::Movie { .. } => MediaType::Movie,
        }
    }

    /// Identifier of this item in its library manager, when cross-referenced.
    pub fn manager_id(&self) -> Option<i64> {
        match self {
            MediaKind::Tv { sonarr_id, .. } => *sonarr_id,
            MediaKind::Movie { radarr_id, .. } => *radarr_id,
        }
    }
}

/// One entry of the normalized library snapshot.
///
/// Rebuilt from scratch on every snapshot pass; the media server and the
/// library managers remain the durable sources of truth. `status` starts as
/// the source-provided lifecycle value (for tv the manager's
/// ended/continuing state, or the `"archived"` sentinel when the item
/// already lives in an archive folder) and is overwritten when a
/// [`Classification`](crate::rules::Classification) is applied to produce a
/// record for the cache or the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Opaque identifier from the media server.
    pub id: String,
    /// Display name; also the (fragile) cross-system join key.
    pub title: String,
    #[serde(flatten)]
    pub kind: MediaKind,
    /// Size in gigabytes; 0 when unknown.
    pub size: f64,
    /// `YYYY-MM-DD`; absent means never watched or unknown.
    #[serde(default)]
    pub last_watched: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub watch_count: u32,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub rule: RetentionRule,
    #[serde(default)]
    pub streaming_services: Vec<String>,
    /// Absolute path to the primary media file, when known.
    #[serde(default)]
    pub file_path: Option<String>,
    /// Manager-reported root folder; `None` means the item exists on the
    /// media server but is not tracked by a library manager.
    #[serde(default)]
    pub root_folder_path: Option<String>,
    /// Human-readable explanation set alongside `status`.
    #[serde(default)]
    pub reason: Option<String>,
}

impl MediaItem {
    pub fn media_type(&self) -> MediaType {
        self.kind.media_type()
    }

    pub fn is_tv(&self) -> bool {
        self.media_type() == MediaType::Tv
    }

    pub fn is_movie(&self) -> bool {
        self.media_type() == MediaType::Movie
    }

    /// The manager's ended/ended-equivalent lifecycle states. Upstreams are
    /// not consistent about casing, so both observed forms are accepted.
    pub fn has_ended(&self) -> bool {
        matches!(self.status.as_deref(), Some("ended") | Some("Ended"))
    }

    pub fn is_archived(&self) -> bool {
        self.status.as_deref() == Some("archived")
    }
}

/// Streaming highlight entry: an item whose title returned a non-empty
/// overall watch-provider result, independent of the preferred-provider
/// filter applied to [`MediaItem::streaming_services`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingCard {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub size: f64,
    /// All providers the title is available on, not just preferred ones.
    pub providers: Vec<String>,
}
