use std::sync::Arc;
use std::time::Duration;

use reclaimarr_model::{
    ClassifiedItem, Dashboard, LibraryStats, MediaItem, RecommendedActions, StorageInfo,
};
use tracing::{error, info, warn};

use crate::cache::CacheKeys;
use crate::clients::LibrarySummary;
use crate::context::HousekeepingContext;
use crate::snapshot::{Snapshot, build_snapshot};
use crate::{rules, storage};

/// TTL of the published dashboard aggregate.
pub const BASE_TTL: Duration = Duration::from_secs(6 * 60 * 60);
/// TTL of the raw per-stage caches; twice the dashboard TTL so the
/// dashboard expires independent of the raw data.
pub const RAW_TTL: Duration = Duration::from_secs(12 * 60 * 60);
/// Dead-man's-switch on the single-flight marker, for a sync that dies
/// without unwinding.
pub const FLIGHT_TTL: Duration = Duration::from_secs(30 * 60);

/// Ended shows below this size are not surfaced as recommended actions.
const ENDED_SHOW_FLOOR_GB: f64 = 55.0;

/// Returned to a manual trigger racing an in-flight sync; the request is
/// rejected, never queued.
#[derive(Debug, thiserror::Error)]
#[error("A sync is already in progress")]
pub struct SyncInFlight;

/// Spawn a guarded sync on a worker task. The guard is claimed before
/// spawning and moved into the task, so it is released on completion,
/// failure, or panic alike.
pub fn spawn_guarded_sync(ctx: Arc<HousekeepingContext>) -> Result<(), SyncInFlight> {
    let guard = ctx
        .cache
        .try_begin_flight(CacheKeys::sync_flight(), FLIGHT_TTL)
        .ok_or(SyncInFlight)?;

    tokio::spawn(async move {
        let _guard = guard;
        run_full_sync(&ctx).await;
        info!("Manual sync finished, in-flight marker cleared");
    });

    Ok(())
}

/// One full sync pass. Exceptions never escape: a failed pass logs with
/// context and leaves the previously cached dashboard authoritative.
pub async fn run_full_sync(ctx: &HousekeepingContext) {
    info!("--- Starting background sync ---");
    match run_full_sync_inner(ctx).await {
        Ok(()) => info!("--- Background sync completed: dashboard data is now cached ---"),
        Err(err) => error!("Background sync failed: {err:#}"),
    }
}

async fn run_full_sync_inner(ctx: &HousekeepingContext) -> anyhow::Result<()> {
    let settings = ctx.settings.load();
    let cache = &ctx.cache;

    // Stage order is fixed: summaries, folders, snapshot, classification,
    // storage, dashboard. Each stage degrades independently.
    let sonarr_summary = ctx.sonarr.library_summary().await.unwrap_or_else(|err| {
        warn!("Tv manager summary unavailable: {err}");
        LibrarySummary::default()
    });
    cache.set(CacheKeys::sonarr_summary(), &sonarr_summary, RAW_TTL)?;

    let radarr_summary = ctx.radarr.library_summary().await.unwrap_or_else(|err| {
        warn!("Movie manager summary unavailable: {err}");
        LibrarySummary::default()
    });
    cache.set(CacheKeys::radarr_summary(), &radarr_summary, RAW_TTL)?;

    let sonarr_folders = ctx.sonarr.root_folders().await.unwrap_or_else(|err| {
        warn!("Tv manager root folders unavailable: {err}");
        Vec::new()
    });
    cache.set(CacheKeys::sonarr_folders(), &sonarr_folders, RAW_TTL)?;

    let radarr_folders = ctx.radarr.root_folders().await.unwrap_or_else(|err| {
        warn!("Movie manager root folders unavailable: {err}");
        Vec::new()
    });
    cache.set(CacheKeys::radarr_folders(), &radarr_folders, RAW_TTL)?;

    let snapshot = build_snapshot(ctx, &settings).await;
    cache.set(CacheKeys::snapshot(), &snapshot, RAW_TTL)?;

    let today = chrono::Utc::now().date_naive();
    let classified: Vec<MediaItem> = rules::classify(&snapshot.items, &settings, today)
        .into_iter()
        .map(ClassifiedItem::into_record)
        .collect();
    cache.set(CacheKeys::classified(), &classified, RAW_TTL)?;

    let combined = storage::combined_usage(&settings.mount_points);
    cache.set(CacheKeys::storage(), &combined, RAW_TTL)?;

    let archive = ctx
        .archive_drive
        .as_deref()
        .and_then(storage::drive_usage)
        .unwrap_or_default();
    cache.set(CacheKeys::archive_storage(), &archive, RAW_TTL)?;

    let dashboard = build_dashboard(
        &snapshot,
        classified,
        &sonarr_summary,
        &radarr_summary,
        combined,
        archive,
    );
    cache.set(CacheKeys::dashboard(), &dashboard, BASE_TTL)?;

    Ok(())
}

/// Derive the dashboard aggregate from one pass's worth of data.
fn build_dashboard(
    snapshot: &Snapshot,
    classified: Vec<MediaItem>,
    sonarr_summary: &LibrarySummary,
    radarr_summary: &LibrarySummary,
    storage_data: StorageInfo,
    archive_data: StorageInfo,
) -> Dashboard {
    let candidates: Vec<MediaItem> = classified
        .iter()
        .filter(|item| {
            item.status
                .as_deref()
                .is_some_and(|s| s.contains("candidate"))
        })
        .cloned()
        .collect();
    let potential_savings = round2(candidates.iter().map(|c| c.size).sum());

    let mut large_movies: Vec<MediaItem> = classified
        .iter()
        .filter(|item| item.is_movie() && !item.is_archived())
        .cloned()
        .collect();
    sort_by_size_desc(&mut large_movies);
    large_movies.truncate(10);

    let mut ended_shows: Vec<MediaItem> = snapshot
        .items
        .iter()
        .filter(|item| item.is_tv() && item.has_ended() && item.size >= ENDED_SHOW_FLOOR_GB)
        .cloned()
        .collect();
    sort_by_size_desc(&mut ended_shows);
    ended_shows.truncate(5);

    let mut streaming_movies: Vec<MediaItem> = classified
        .iter()
        .filter(|item| item.is_movie() && !item.streaming_services.is_empty())
        .cloned()
        .collect();
    sort_by_size_desc(&mut streaming_movies);
    streaming_movies.truncate(5);

    let mut streaming_highlights = snapshot.streaming_candidates.clone();
    streaming_highlights
        .sort_by(|a, b| b.size.partial_cmp(&a.size).unwrap_or(std::cmp::Ordering::Equal));

    let on_streaming = snapshot
        .items
        .iter()
        .filter(|item| !item.streaming_services.is_empty())
        .count() as u64;

    Dashboard {
        storage_data,
        archive_data,
        potential_savings,
        candidates,
        large_movies,
        streaming_highlights,
        library_stats: LibraryStats {
            tv: sonarr_summary.total_count,
            tv_size: round1(sonarr_summary.total_gb),
            tv_episodes: sonarr_summary.total_episodes,
            movies: radarr_summary.total_count,
            movies_size: round1(radarr_summary.total_gb),
            on_streaming,
        },
        recommended_actions: RecommendedActions {
            ended_shows,
            streaming_movies,
        },
    }
}

fn sort_by_size_desc(items: &mut [MediaItem]) {
    items.sort_by(|a, b| b.size.partial_cmp(&a.size).unwrap_or(std::cmp::Ordering::Equal));
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use reclaimarr_model::{MediaKind, RetentionRule, StreamingCard};

    fn item(id: &str, kind: MediaKind, size: f64, status: &str) -> MediaItem {
        MediaItem {
            id: id.into(),
            title: format!("Title {id}"),
            kind,
            size,
            last_watched: None,
            watch_count: 0,
            status: Some(status.into()),
            rule: RetentionRule::AutoManage,
            streaming_services: vec![],
            file_path: None,
            root_folder_path: Some("/library".into()),
            reason: None,
        }
    }

    fn movie(id: &str, size: f64, status: &str) -> MediaItem {
        item(
            id,
            MediaKind::Movie {
                year: None,
                radarr_id: None,
            },
            size,
            status,
        )
    }

    fn show(id: &str, size: f64, status: &str) -> MediaItem {
        item(
            id,
            MediaKind::Tv {
                seasons: 1,
                episodes: 10,
                sonarr_id: None,
            },
            size,
            status,
        )
    }

    #[test]
    fn potential_savings_sums_candidate_sizes_only() {
        let classified = vec![
            movie("1", 10.0, "candidate-delete"),
            movie("2", 5.5, "candidate-archive"),
            movie("3", 99.0, "active"),
        ];
        let dashboard = build_dashboard(
            &Snapshot::default(),
            classified,
            &LibrarySummary::default(),
            &LibrarySummary::default(),
            StorageInfo::default(),
            StorageInfo::default(),
        );

        assert_eq!(dashboard.candidates.len(), 2);
        assert!((dashboard.potential_savings - 15.5).abs() < 1e-9);
    }

    #[test]
    fn large_movies_exclude_archived_and_cap_at_ten() {
        let mut classified: Vec<MediaItem> = (0..12)
            .map(|i| movie(&i.to_string(), i as f64, "active"))
            .collect();
        classified.push(movie("big-archived", 500.0, "archived"));

        let dashboard = build_dashboard(
            &Snapshot::default(),
            classified,
            &LibrarySummary::default(),
            &LibrarySummary::default(),
            StorageInfo::default(),
            StorageInfo::default(),
        );

        assert_eq!(dashboard.large_movies.len(), 10);
        assert_eq!(dashboard.large_movies[0].size, 11.0);
        assert!(dashboard.large_movies.iter().all(|m| !m.is_archived()));
    }

    #[test]
    fn ended_shows_respect_the_size_floor() {
        let snapshot = Snapshot {
            items: vec![
                show("small", 20.0, "ended"),
                show("big", 80.0, "ended"),
                show("running", 120.0, "continuing"),
            ],
            streaming_candidates: vec![],
        };

        let dashboard = build_dashboard(
            &snapshot,
            vec![],
            &LibrarySummary::default(),
            &LibrarySummary::default(),
            StorageInfo::default(),
            StorageInfo::default(),
        );

        assert_eq!(dashboard.recommended_actions.ended_shows.len(), 1);
        assert_eq!(dashboard.recommended_actions.ended_shows[0].id, "big");
    }

    #[test]
    fn streaming_highlights_are_sorted_by_size_descending() {
        let card = |id: &str, size: f64| StreamingCard {
            id: id.into(),
            title: id.into(),
            media_type: reclaimarr_model::MediaType::Movie,
            size,
            providers: vec!["Netflix".into()],
        };
        let snapshot = Snapshot {
            items: vec![],
            streaming_candidates: vec![card("a", 2.0), card("b", 30.0), card("c", 7.0)],
        };

        let dashboard = build_dashboard(
            &snapshot,
            vec![],
            &LibrarySummary::default(),
            &LibrarySummary::default(),
            StorageInfo::default(),
            StorageInfo::default(),
        );

        let order: Vec<&str> = dashboard
            .streaming_highlights
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn concurrent_triggers_get_exactly_one_sync() {
        let env = reclaimarr_config::EnvConfig {
            server_host: "127.0.0.1".into(),
            server_port: 0,
            media_server_url: None,
            media_server_token: None,
            sonarr_url: None,
            sonarr_api_key: None,
            radarr_url: None,
            radarr_api_key: None,
            tmdb_api_key: None,
            tmdb_region: "US".into(),
            archive_drive: None,
            data_dir: tempfile::tempdir().unwrap().keep(),
            cors_allowed_origins: vec![],
        };
        let ctx = Arc::new(HousekeepingContext::from_env(&env));

        let first = spawn_guarded_sync(Arc::clone(&ctx));
        let second = spawn_guarded_sync(Arc::clone(&ctx));
        assert!(first.is_ok());
        assert!(second.is_err());
    }
}
