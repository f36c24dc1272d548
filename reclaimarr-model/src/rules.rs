use serde::{Deserialize, Serialize};

use crate::media::MediaItem;

/// Retention policy assigned to a media item. User-settable per item;
/// everything defaults to `auto-manage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RetentionRule {
    #[serde(rename = "keep-forever")]
    KeepForever,
    #[serde(rename = "archive-ended")]
    ArchiveEnded,
    #[serde(rename = "delete-if-streaming")]
    DeleteIfStreaming,
    #[serde(rename = "archive-after-6months")]
    ArchiveAfterMonths,
    #[serde(rename = "delete-after-watched")]
    DeleteAfterWatched,
    #[default]
    #[serde(rename = "auto-manage")]
    AutoManage,
}

/// Outcome of evaluating the retention rules against one item.
///
/// The engine never mutates its input; it returns these tagged results and
/// the caller decides whether to materialize them back into wire-shaped
/// records via [`ClassifiedItem::into_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No rule matched; the source-provided status stands.
    Active,
    Protected,
    CandidateArchive { reason: String },
    CandidateDelete { reason: String },
    NotMonitored { reason: String },
}

impl Classification {
    /// Status label written into serialized records. `None` for
    /// [`Classification::Active`], which keeps the source value.
    pub fn status_label(&self) -> Option<&'static str> {
        match self {
            Classification::Active => None,
            Classification::Protected => Some("protected"),
            Classification::CandidateArchive { .. } => Some("candidate-archive"),
            Classification::CandidateDelete { .. } => Some("candidate-delete"),
            Classification::NotMonitored { .. } => Some("not-monitored"),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Classification::Active | Classification::Protected => None,
            Classification::CandidateArchive { reason }
            | Classification::CandidateDelete { reason }
            | Classification::NotMonitored { reason } => Some(reason),
        }
    }

    pub fn is_candidate(&self) -> bool {
        matches!(
            self,
            Classification::CandidateArchive { .. } | Classification::CandidateDelete { .. }
        )
    }
}

/// A snapshot item together with its rule-engine verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedItem {
    pub item: MediaItem,
    pub classification: Classification,
}

impl ClassifiedItem {
    /// Materialize the verdict into a standalone record: the item with
    /// `status` and `reason` overwritten, ready for the cache and the API.
    pub fn into_record(self) -> MediaItem {
        let mut record = self.item;
        if let Some(label) = self.classification.status_label() {
            record.status = Some(label.to_string());
        }
        if let Some(reason) = self.classification.reason() {
            record.reason = Some(reason.to_string());
        }
        record
    }
}
