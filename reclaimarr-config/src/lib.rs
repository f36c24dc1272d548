//! # Reclaimarr Config
//!
//! Two configuration surfaces with different lifetimes:
//!
//! - [`EnvConfig`]: process-level bootstrap (upstream URLs and keys, bind
//!   address, data directory). Read once at startup from the environment.
//! - [`Settings`] via [`SettingsStore`]: the user-tunable retention
//!   parameters and allow-lists, resolved on every load from three layers
//!   with documented precedence: hardcoded defaults < environment values <
//!   non-empty values from the persisted `settings.json`.

pub mod env;
pub mod mappings;
pub mod settings;
pub mod store;

pub use env::EnvConfig;
pub use mappings::{ArchiveMapping, parse_env_mappings};
pub use settings::{Settings, SettingsOverlay};
pub use store::{SettingsError, SettingsStore};
