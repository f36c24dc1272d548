//! REST clients for the upstream systems. Each client tolerates being
//! unconfigured: constructors never fail, and calls against an
//! unconfigured client return [`UpstreamError::NotConfigured`]
//! (or degrade to empty results where the caller prefers that).
//!
//! [`UpstreamError::NotConfigured`]: crate::error::UpstreamError::NotConfigured

pub mod arr;
pub mod media_server;
pub mod streaming;

pub use arr::{LibrarySummary, MovieResource, RadarrClient, RootFolder, SeriesResource, SonarrClient};
pub use media_server::{MediaServerClient, ServerLibraryEntry};
pub use streaming::StreamingLookup;
