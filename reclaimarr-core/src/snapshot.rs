use std::collections::HashMap;

use reclaimarr_config::Settings;
use reclaimarr_model::{MediaItem, MediaKind, MediaType, StreamingCard};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clients::{MovieResource, SeriesResource, ServerLibraryEntry};
use crate::context::HousekeepingContext;
use crate::resolver::{ExactTitleResolver, TitleResolver};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Streaming lookups cost two network calls per title, so only titles
/// large enough to matter get one.
const MOVIE_STREAMING_GATE_GB: f64 = 15.0;
const TV_STREAMING_GATE_GB: f64 = 10.0;

/// One full normalized pass over the media server library, cross-referenced
/// against both library managers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub items: Vec<MediaItem>,
    /// Titles with any streaming availability at all, independent of the
    /// preferred-provider filter on the items themselves.
    pub streaming_candidates: Vec<StreamingCard>,
}

/// Build a fresh snapshot. An unreachable media server yields an empty
/// snapshot rather than an error: callers must treat empty as "possibly
/// not yet available".
pub async fn build_snapshot(ctx: &HousekeepingContext, settings: &Settings) -> Snapshot {
    let entries = match ctx.media_server.fetch_library().await {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Media server unavailable, returning empty snapshot: {err}");
            return Snapshot::default();
        }
    };

    let series_index = match ctx.sonarr.list_series().await {
        Ok(series) => Some(series),
        Err(err) => {
            warn!("Could not fetch series from the tv manager: {err}");
            None
        }
    };
    let movie_index = match ctx.radarr.list_movies().await {
        Ok(movies) => Some(movies),
        Err(err) => {
            warn!("Could not fetch movies from the movie manager: {err}");
            None
        }
    };

    let tv_resolver = series_index
        .as_ref()
        .map(|series| ExactTitleResolver::new(series.iter().map(|s| (s.title.clone(), s.id))))
        .unwrap_or_else(ExactTitleResolver::unavailable);
    let movie_resolver = movie_index
        .as_ref()
        .map(|movies| ExactTitleResolver::new(movies.iter().map(|m| (m.title.clone(), m.id))))
        .unwrap_or_else(ExactTitleResolver::unavailable);

    if !tv_resolver.has_data() {
        warn!("Tv manager data unavailable; show titles stay unresolved this pass");
    }
    if !movie_resolver.has_data() {
        warn!("Movie manager data unavailable; movie titles stay unresolved this pass");
    }

    let series_by_id: HashMap<i64, &SeriesResource> = series_index
        .iter()
        .flatten()
        .map(|s| (s.id, s))
        .collect();
    let movies_by_id: HashMap<i64, &MovieResource> = movie_index
        .iter()
        .flatten()
        .map(|m| (m.id, m))
        .collect();

    let mut items = Vec::with_capacity(entries.len());
    let mut streaming_candidates = Vec::new();

    for entry in entries {
        let mut item = match entry.media_type {
            MediaType::Tv => normalize_show(&entry, &tv_resolver, &series_by_id),
            MediaType::Movie => normalize_movie(&entry, &movie_resolver, &movies_by_id),
        };

        // Content already sitting in an archive folder must not come back
        // as a fresh candidate.
        if let Some(root) = &item.root_folder_path
            && settings
                .archive_folders_for(item.media_type())
                .contains(root)
        {
            item.status = Some("archived".to_string());
        }

        if settings.check_streaming_availability
            && ctx.streaming.configured()
            && passes_streaming_gate(item.media_type(), item.size)
        {
            match ctx
                .streaming
                .providers_for(item.media_type(), &item.title, entry.year)
                .await
            {
                Ok(providers) if !providers.is_empty() => {
                    streaming_candidates.push(StreamingCard {
                        id: item.id.clone(),
                        title: item.title.clone(),
                        media_type: item.media_type(),
                        size: item.size,
                        providers: providers.clone(),
                    });
                    item.streaming_services =
                        filter_preferred(providers, &settings.preferred_streaming_services);
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("Streaming lookup failed for '{}': {err}", item.title);
                }
            }
        }

        items.push(item);
    }

    info!(
        "Snapshot built: {} items, {} streaming candidates",
        items.len(),
        streaming_candidates.len()
    );
    Snapshot {
        items,
        streaming_candidates,
    }
}

fn normalize_show(
    entry: &ServerLibraryEntry,
    resolver: &dyn TitleResolver,
    series_by_id: &HashMap<i64, &SeriesResource>,
) -> MediaItem {
    let series = resolver
        .resolve(&entry.title)
        .and_then(|id| series_by_id.get(&id).copied());
    if series.is_none() && resolver.has_data() {
        debug!("Show '{}' present on the media server only", entry.title);
    }

    let size_bytes = series
        .map(|s| s.statistics.map(|st| st.size_on_disk).unwrap_or(0))
        .unwrap_or(entry.size_bytes);

    MediaItem {
        id: entry.id.clone(),
        title: entry.title.clone(),
        kind: MediaKind::Tv {
            seasons: entry.seasons,
            episodes: entry.episodes,
            sonarr_id: series.map(|s| s.id),
        },
        size: round2(size_bytes as f64 / GIB),
        last_watched: entry.last_watched,
        watch_count: entry.watch_count,
        status: series
            .and_then(|s| s.status.clone())
            .or_else(|| Some("active".to_string())),
        rule: Default::default(),
        streaming_services: Vec::new(),
        file_path: entry
            .file_path
            .clone()
            .or_else(|| series.and_then(|s| s.path.clone())),
        root_folder_path: series.and_then(|s| s.root_folder_path.clone()),
        reason: None,
    }
}

fn normalize_movie(
    entry: &ServerLibraryEntry,
    resolver: &dyn TitleResolver,
    movies_by_id: &HashMap<i64, &MovieResource>,
) -> MediaItem {
    let movie = resolver
        .resolve(&entry.title)
        .and_then(|id| movies_by_id.get(&id).copied());
    if movie.is_none() && resolver.has_data() {
        debug!("Movie '{}' present on the media server only", entry.title);
    }

    let size_bytes = movie.map(|m| m.size_on_disk).unwrap_or(entry.size_bytes);

    MediaItem {
        id: entry.id.clone(),
        title: entry.title.clone(),
        kind: MediaKind::Movie {
            year: entry.year,
            radarr_id: movie.map(|m| m.id),
        },
        size: round2(size_bytes as f64 / GIB),
        last_watched: entry.last_watched,
        watch_count: entry.watch_count,
        status: Some("active".to_string()),
        rule: Default::default(),
        streaming_services: Vec::new(),
        file_path: entry.file_path.clone().or_else(|| {
            movie.and_then(|m| m.movie_file.as_ref().and_then(|f| f.path.clone()))
        }),
        root_folder_path: movie.and_then(|m| m.root_folder_path.clone()),
        reason: None,
    }
}

fn passes_streaming_gate(media_type: MediaType, size_gb: f64) -> bool {
    match media_type {
        MediaType::Movie => size_gb > MOVIE_STREAMING_GATE_GB,
        MediaType::Tv => size_gb >= TV_STREAMING_GATE_GB,
    }
}

/// Keep only the user's preferred providers, preserving the lookup's
/// reported order.
fn filter_preferred(providers: Vec<String>, preferred: &[String]) -> Vec<String> {
    providers
        .into_iter()
        .filter(|p| preferred.iter().any(|want| want == p))
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_gate_is_strictly_above_fifteen() {
        assert!(!passes_streaming_gate(MediaType::Movie, 15.0));
        assert!(passes_streaming_gate(MediaType::Movie, 15.01));
    }

    #[test]
    fn tv_gate_is_inclusive_at_ten() {
        assert!(passes_streaming_gate(MediaType::Tv, 10.0));
        assert!(!passes_streaming_gate(MediaType::Tv, 9.99));
    }

    #[test]
    fn preferred_filter_keeps_lookup_order() {
        let providers = vec!["Hulu".to_string(), "Netflix".to_string(), "Max".to_string()];
        let preferred = vec!["Netflix".to_string(), "Hulu".to_string()];
        assert_eq!(
            filter_preferred(providers, &preferred),
            vec!["Hulu".to_string(), "Netflix".to_string()]
        );
    }

    #[test]
    fn empty_preferred_list_filters_everything() {
        let providers = vec!["Netflix".to_string()];
        assert!(filter_preferred(providers, &[]).is_empty());
    }
}
