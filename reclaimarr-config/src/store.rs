use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::settings::{Settings, SettingsOverlay};

/// Failures surfaced to callers of [`SettingsStore::save`]. Load never
/// fails: a missing or malformed file degrades to the lower layers.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable store for user settings overrides: one JSON file under the data
/// directory. Reads re-resolve the full layer stack on every call; writes
/// replace the whole file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join("settings.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve settings from all three layers. On first run (no persisted
    /// file) the merged result is written out once so the user has a file
    /// to edit.
    pub fn load(&self) -> Settings {
        let mut settings = Settings::default();
        settings.apply(SettingsOverlay::from_env());

        match self.read_user_layer() {
            Some(user) => settings.apply(user.without_empty()),
            None if !self.path.exists() => {
                info!(path = %self.path.display(), "No settings file found, bootstrapping from merged config");
                if let Err(err) = self.save(&settings) {
                    warn!("Failed to bootstrap settings file: {err}");
                }
            }
            None => {}
        }

        settings
    }

    /// Persist the full settings object verbatim. The write goes through a
    /// temp file in the same directory and a rename, so a concurrent reader
    /// observes either the old or the new complete file.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(settings)?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| {
            SettingsError::Write {
                path: self.path.clone(),
                source,
            }
        })?;
        tmp.write_all(json.as_bytes())
            .map_err(|source| SettingsError::Write {
                path: self.path.clone(),
                source,
            })?;
        tmp.persist(&self.path).map_err(|err| SettingsError::Write {
            path: self.path.clone(),
            source: err.error,
        })?;

        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    fn read_user_layer(&self) -> Option<SettingsOverlay> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %self.path.display(), "Failed to read settings file: {err}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(overlay) => {
                debug!(path = %self.path.display(), "Loaded user settings layer");
                Some(overlay)
            }
            Err(err) => {
                warn!(path = %self.path.display(), "Settings file is malformed, falling back to env/defaults: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_writes_file_on_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());

        assert!(!store.path().exists());
        let settings = store.load();
        assert!(store.path().exists());
        assert_eq!(settings.auto_delete_after_days, 30);
    }

    #[test]
    fn save_then_load_round_trips_user_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());

        let mut settings = Settings::default();
        settings.archive_after_months = 3;
        settings.movie_archive_folders = vec!["/archive/movies".into()];
        store.save(&settings).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.archive_after_months, 3);
        assert_eq!(loaded.movie_archive_folders, vec!["/archive/movies"]);
    }

    #[test]
    fn malformed_file_degrades_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        fs::write(store.path(), "{not json").unwrap();

        let settings = store.load();
        assert_eq!(settings, {
            let mut expected = Settings::default();
            expected.apply(SettingsOverlay::from_env());
            expected
        });
    }

    #[test]
    fn save_reports_write_failure_instead_of_panicking() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let store = SettingsStore::new(dir.path());
        fs::create_dir_all(store.path()).unwrap();

        let err = store.save(&Settings::default()).unwrap_err();
        assert!(matches!(err, SettingsError::Write { .. }));
    }
}
