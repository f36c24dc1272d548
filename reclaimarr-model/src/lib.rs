//! # Reclaimarr Model
//!
//! Pure domain types for the housekeeping service: media items as reported
//! by the media server and the library managers, retention rules and their
//! classification results, storage views, and the pre-computed dashboard
//! aggregate published to the cache.
//!
//! Everything in this crate is plain data. Clients, caches, and the rule
//! engine live in `reclaimarr-core`.

pub mod dashboard;
pub mod media;
pub mod rules;

pub use dashboard::{Dashboard, LibraryStats, RecommendedActions, StorageInfo};
pub use media::{MediaItem, MediaKind, MediaType, StreamingCard};
pub use rules::{Classification, ClassifiedItem, RetentionRule};
