use reclaimarr_model::MediaType;
use serde::{Deserialize, Serialize};

use crate::mappings::{ArchiveMapping, parse_env_mappings};

/// Fully resolved retention settings: the single source of truth for rule
/// parameters and folder allow-lists.
///
/// Wire names follow the persisted `settings.json` contract; the folder and
/// mount lists keep their environment-variable spellings there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub auto_delete_after_days: i64,
    pub archive_after_months: i64,
    /// Gigabytes to keep free on the library mounts.
    pub keep_free_space: i64,
    pub enable_auto_actions: bool,
    pub check_streaming_availability: bool,
    pub preferred_streaming_services: Vec<String>,
    #[serde(rename = "AVAILABLE_STREAMING_PROVIDERS")]
    pub available_streaming_providers: Vec<String>,
    #[serde(rename = "TV_ARCHIVE_FOLDERS")]
    pub tv_archive_folders: Vec<String>,
    #[serde(rename = "MOVIE_ARCHIVE_FOLDERS")]
    pub movie_archive_folders: Vec<String>,
    #[serde(rename = "MOUNT_POINTS")]
    pub mount_points: Vec<String>,
    pub archive_mappings: Vec<ArchiveMapping>,
    pub sync_interval_minutes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_delete_after_days: 30,
            archive_after_months: 6,
            keep_free_space: 500,
            enable_auto_actions: false,
            check_streaming_availability: true,
            preferred_streaming_services: Vec::new(),
            available_streaming_providers: Vec::new(),
            tv_archive_folders: Vec::new(),
            movie_archive_folders: Vec::new(),
            mount_points: Vec::new(),
            archive_mappings: Vec::new(),
            sync_interval_minutes: 30,
        }
    }
}

impl Settings {
    /// The archive destination allow-list for a media type.
    pub fn archive_folders_for(&self, media_type: MediaType) -> &[String] {
        match media_type {
            MediaType::Tv => &self.tv_archive_folders,
            MediaType::Movie => &self.movie_archive_folders,
        }
    }

    /// Apply one overlay on top of this value. Fields the overlay does not
    /// carry are left untouched; collapsing to defaults happens only because
    /// the base started as [`Settings::default`].
    pub fn apply(&mut self, overlay: SettingsOverlay) {
        let SettingsOverlay {
            auto_delete_after_days,
            archive_after_months,
            keep_free_space,
            enable_auto_actions,
            check_streaming_availability,
            preferred_streaming_services,
            available_streaming_providers,
            tv_archive_folders,
            movie_archive_folders,
            mount_points,
            archive_mappings,
            sync_interval_minutes,
        } = overlay;

        if let Some(value) = auto_delete_after_days {
            self.auto_delete_after_days = value;
        }
        if let Some(value) = archive_after_months {
            self.archive_after_months = value;
        }
        if let Some(value) = keep_free_space {
            self.keep_free_space = value;
        }
        if let Some(value) = enable_auto_actions {
            self.enable_auto_actions = value;
        }
        if let Some(value) = check_streaming_availability {
            self.check_streaming_availability = value;
        }
        if let Some(value) = preferred_streaming_services {
            self.preferred_streaming_services = value;
        }
        if let Some(value) = available_streaming_providers {
            self.available_streaming_providers = value;
        }
        if let Some(value) = tv_archive_folders {
            self.tv_archive_folders = value;
        }
        if let Some(value) = movie_archive_folders {
            self.movie_archive_folders = value;
        }
        if let Some(value) = mount_points {
            self.mount_points = value;
        }
        if let Some(value) = archive_mappings {
            self.archive_mappings = value;
        }
        if let Some(value) = sync_interval_minutes {
            self.sync_interval_minutes = value;
        }
    }
}

/// One layer of settings: every field optional, `None` meaning "this layer
/// has nothing to say". The same shape deserializes the user
/// `settings.json`, so a partial file is a valid overlay.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsOverlay {
    #[serde(default)]
    pub auto_delete_after_days: Option<i64>,
    #[serde(default)]
    pub archive_after_months: Option<i64>,
    #[serde(default)]
    pub keep_free_space: Option<i64>,
    #[serde(default)]
    pub enable_auto_actions: Option<bool>,
    #[serde(default)]
    pub check_streaming_availability: Option<bool>,
    #[serde(default)]
    pub preferred_streaming_services: Option<Vec<String>>,
    #[serde(default, rename = "AVAILABLE_STREAMING_PROVIDERS")]
    pub available_streaming_providers: Option<Vec<String>>,
    #[serde(default, rename = "TV_ARCHIVE_FOLDERS")]
    pub tv_archive_folders: Option<Vec<String>>,
    #[serde(default, rename = "MOVIE_ARCHIVE_FOLDERS")]
    pub movie_archive_folders: Option<Vec<String>>,
    #[serde(default, rename = "MOUNT_POINTS")]
    pub mount_points: Option<Vec<String>>,
    #[serde(default)]
    pub archive_mappings: Option<Vec<ArchiveMapping>>,
    #[serde(default)]
    pub sync_interval_minutes: Option<u64>,
}

impl SettingsOverlay {
    /// Build the environment layer from process variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SettingsOverlay::from_env`] but with an injectable source,
    /// so the precedence function is testable without process-global state.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            auto_delete_after_days: parse_number(lookup("AUTO_DELETE_AFTER_DAYS")),
            archive_after_months: parse_number(lookup("ARCHIVE_AFTER_MONTHS")),
            keep_free_space: parse_number(lookup("KEEP_FREE_SPACE")),
            enable_auto_actions: lookup("ENABLE_AUTO_ACTIONS").map(|v| parse_bool(&v)),
            check_streaming_availability: lookup("CHECK_STREAMING_AVAILABILITY")
                .map(|v| parse_bool(&v)),
            preferred_streaming_services: lookup("STREAMING_PROVIDERS").map(|v| split_list(&v)),
            available_streaming_providers: lookup("AVAILABLE_STREAMING_PROVIDERS")
                .map(|v| split_list(&v)),
            tv_archive_folders: lookup("TV_ARCHIVE_FOLDERS").map(|v| split_list(&v)),
            movie_archive_folders: lookup("MOVIE_ARCHIVE_FOLDERS").map(|v| split_list(&v)),
            mount_points: lookup("MOUNT_POINTS").map(|v| split_list(&v)),
            archive_mappings: lookup("ARCHIVE_MAPPINGS_ENV").map(|v| parse_env_mappings(&v)),
            sync_interval_minutes: parse_number(lookup("DATA_UPDATE_INTERVAL")),
        }
    }

    /// Enforce the user-layer emptiness rule: an empty list never overrides
    /// a lower layer, while an explicit boolean (including `false`) does.
    pub fn without_empty(mut self) -> Self {
        fn drop_empty<T>(slot: &mut Option<Vec<T>>) {
            if slot.as_ref().is_some_and(Vec::is_empty) {
                *slot = None;
            }
        }
        drop_empty(&mut self.preferred_streaming_services);
        drop_empty(&mut self.available_streaming_providers);
        drop_empty(&mut self.tv_archive_folders);
        drop_empty(&mut self.movie_archive_folders);
        drop_empty(&mut self.mount_points);
        drop_empty(&mut self.archive_mappings);
        self
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1")
}

fn parse_number<T: std::str::FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|v| v.trim().parse().ok())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_layer(pairs: &[(&str, &str)]) -> SettingsOverlay {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SettingsOverlay::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
    }

    #[test]
    fn env_values_override_defaults() {
        let mut settings = Settings::default();
        settings.apply(env_layer(&[
            ("TV_ARCHIVE_FOLDERS", "/archive/tv, /archive/tv2"),
            ("DATA_UPDATE_INTERVAL", "15"),
        ]));

        assert_eq!(settings.tv_archive_folders, vec!["/archive/tv", "/archive/tv2"]);
        assert_eq!(settings.sync_interval_minutes, 15);
        // Untouched fields keep their defaults.
        assert_eq!(settings.auto_delete_after_days, 30);
    }

    #[test]
    fn user_layer_wins_over_env_layer() {
        let mut settings = Settings::default();
        settings.apply(env_layer(&[("STREAMING_PROVIDERS", "Netflix")]));

        let user: SettingsOverlay =
            serde_json::from_str(r#"{"preferredStreamingServices": ["Max", "Hulu"]}"#).unwrap();
        settings.apply(user.without_empty());

        assert_eq!(settings.preferred_streaming_services, vec!["Max", "Hulu"]);
    }

    #[test]
    fn explicit_false_from_user_file_overrides() {
        let mut settings = Settings::default();
        settings.apply(env_layer(&[("ENABLE_AUTO_ACTIONS", "true")]));
        assert!(settings.enable_auto_actions);

        let user: SettingsOverlay =
            serde_json::from_str(r#"{"enableAutoActions": false}"#).unwrap();
        settings.apply(user.without_empty());
        assert!(!settings.enable_auto_actions);
    }

    #[test]
    fn empty_user_list_does_not_override() {
        let mut settings = Settings::default();
        settings.apply(env_layer(&[("MOUNT_POINTS", "/mnt/a,/mnt/b")]));

        let user: SettingsOverlay = serde_json::from_str(r#"{"MOUNT_POINTS": []}"#).unwrap();
        settings.apply(user.without_empty());

        assert_eq!(settings.mount_points, vec!["/mnt/a", "/mnt/b"]);
    }

    #[test]
    fn env_booleans_accept_numeric_form() {
        let settings = env_layer(&[("ENABLE_AUTO_ACTIONS", "1")]);
        assert_eq!(settings.enable_auto_actions, Some(true));
    }

    #[test]
    fn settings_json_round_trips_with_wire_names() {
        let settings = Settings {
            tv_archive_folders: vec!["/archive/tv".into()],
            ..Settings::default()
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["TV_ARCHIVE_FOLDERS"][0], "/archive/tv");
        assert_eq!(json["autoDeleteAfterDays"], 30);

        let back: Settings = serde_json::from_value(json).unwrap();
        assert_eq!(back, settings);
    }
}
