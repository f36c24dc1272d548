//! # Reclaimarr Core
//!
//! The housekeeping engine behind the dashboard:
//!
//! - REST clients for the media server, the tv/movie library managers, and
//!   the streaming watch-provider lookup ([`clients`]).
//! - A time-boxed in-process cache with a single-flight guard ([`cache`]).
//! - The snapshot builder that normalizes upstream items ([`snapshot`]),
//!   the retention rule engine ([`rules`]), and the sync orchestrator that
//!   ties them together and publishes the dashboard aggregate ([`sync`]).
//! - The action executor for user-confirmed archive/delete operations
//!   ([`actions`]) and the scheduled cleanup pass ([`cleanup`]).
//!
//! Everything operates through a [`HousekeepingContext`] constructed once
//! at startup and passed by reference; there is no ambient global state.

pub mod actions;
pub mod cache;
pub mod cleanup;
pub mod clients;
pub mod context;
pub mod error;
pub mod resolver;
pub mod rules;
pub mod snapshot;
pub mod storage;
pub mod sync;

pub use cache::{CacheKeys, FlightGuard, TtlCache};
pub use context::HousekeepingContext;
pub use error::{ActionError, UpstreamError};
pub use snapshot::Snapshot;
