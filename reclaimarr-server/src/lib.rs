//! # Reclaimarr Server
//!
//! The HTTP-facing binary of the housekeeping service:
//!
//! - An axum route layer over the cache-backed dashboard, the full
//!   classified content list, settings, and the action endpoints.
//! - A background scheduler running the full sync on a fixed interval and
//!   the cleanup pass once a day.
//! - Rotating file logging, tailed by the `/api/logs` endpoint.
//!
//! All slow upstream work happens on the scheduler or on spawned worker
//! tasks; request handlers read the cache or validate-and-spawn.

pub mod errors;
pub mod handlers;
pub mod logging;
pub mod routes;
pub mod scheduler;
pub mod state;

pub use errors::{AppError, AppResult};
pub use state::AppState;
