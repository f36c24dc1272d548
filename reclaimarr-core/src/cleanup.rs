use reclaimarr_config::{ArchiveMapping, Settings};
use reclaimarr_model::{Classification, ClassifiedItem, MediaItem, MediaType};
use tracing::{error, info, warn};

use crate::cache::CacheKeys;
use crate::context::HousekeepingContext;
use crate::snapshot::build_snapshot;
use crate::rules;

/// The scheduled/manual cleanup pass: re-evaluate the library and act on
/// every candidate. Returns the ordered action log, which the dry-run
/// endpoint hands straight back to the caller.
///
/// Live runs require `enableAutoActions`; dry runs always proceed.
/// Per-item failures are logged and skipped, never aborting the pass.
pub async fn perform_cleanup(ctx: &HousekeepingContext, dry_run: bool) -> Vec<String> {
    let run_mode = if dry_run { "DRY RUN" } else { "LIVE RUN" };
    let mut log = vec![format!("--- Starting cleanup job ({run_mode}) ---")];
    info!("{}", log[0]);

    let settings = ctx.settings.load();
    if !settings.enable_auto_actions && !dry_run {
        let msg = "Automatic actions are disabled in settings. Cleanup job exiting.".to_string();
        info!("{msg}");
        log.push(msg);
        return log;
    }

    log.push("Fetching latest library data for cleanup analysis...".to_string());
    let snapshot = build_snapshot(ctx, &settings).await;
    let today = chrono::Utc::now().date_naive();
    let candidates: Vec<ClassifiedItem> = rules::classify(&snapshot.items, &settings, today)
        .into_iter()
        .filter(|c| c.classification.is_candidate())
        .collect();

    if candidates.is_empty() {
        let msg = "No cleanup candidates found. Job finished.".to_string();
        info!("{msg}");
        log.push(msg);
        return log;
    }

    let msg = format!("Found {} candidates for automated cleanup.", candidates.len());
    warn!("{msg}");
    log.push(msg);

    let mut success_count = 0usize;
    for candidate in &candidates {
        match &candidate.classification {
            Classification::CandidateArchive { .. } => {
                archive_candidate(
                    ctx,
                    &settings,
                    &candidate.item,
                    dry_run,
                    &mut log,
                    &mut success_count,
                )
                .await;
            }
            Classification::CandidateDelete { .. } => {
                delete_candidate(ctx, &candidate.item, dry_run, &mut log, &mut success_count)
                    .await;
            }
            _ => {}
        }
    }

    if !dry_run && success_count > 0 {
        ctx.cache.delete(CacheKeys::dashboard());
        ctx.cache.delete(CacheKeys::snapshot());
        ctx.cache.delete(CacheKeys::classified());
    }

    let final_msg = format!(
        "--- Cleanup job finished ({run_mode}). Proposed actions for {} items, {} executed. ---",
        candidates.len(),
        success_count
    );
    info!("{final_msg}");
    log.push(final_msg);
    log
}

async fn archive_candidate(
    ctx: &HousekeepingContext,
    settings: &Settings,
    item: &MediaItem,
    dry_run: bool,
    log: &mut Vec<String>,
    success_count: &mut usize,
) {
    let Some(root_path) = item.root_folder_path.as_deref() else {
        push_error(
            log,
            format!("[SKIP] Cannot archive '{}': item is missing path information.", item.title),
        );
        return;
    };
    if item.file_path.as_deref().is_none_or(str::is_empty) {
        push_error(
            log,
            format!("[SKIP] Cannot archive '{}': item is missing path information.", item.title),
        );
        return;
    }

    let Some(destination) = resolve_destination(settings, item.media_type(), root_path) else {
        push_error(
            log,
            format!(
                "[SKIP] Cannot archive '{}': no unambiguous mapping for source '{root_path}'.",
                item.title
            ),
        );
        return;
    };

    log.push(format!(
        "[ARCHIVE] Proposing to move '{}' to '{destination}'.",
        item.title
    ));
    if dry_run {
        return;
    }

    let Some(manager_id) = item.kind.manager_id() else {
        push_error(
            log,
            format!("[SKIP] Cannot archive '{}': no library manager id.", item.title),
        );
        return;
    };

    let result = match item.media_type() {
        MediaType::Tv => ctx.sonarr.move_series(manager_id, &destination).await,
        MediaType::Movie => ctx.radarr.move_movie(manager_id, &destination).await,
    };
    match result {
        Ok(_) => *success_count += 1,
        Err(err) => {
            push_error(
                log,
                format!("Failed to complete archive for '{}': {err}", item.title),
            );
        }
    }
}

async fn delete_candidate(
    ctx: &HousekeepingContext,
    item: &MediaItem,
    dry_run: bool,
    log: &mut Vec<String>,
    success_count: &mut usize,
) {
    log.push(format!("[DELETE] Proposing to delete '{}'.", item.title));
    if dry_run {
        return;
    }

    warn!("EXECUTING DELETE on '{}'...", item.title);
    match ctx.media_server.delete_item(&item.id).await {
        Ok(()) => *success_count += 1,
        Err(err) => {
            push_error(log, format!("Failed to delete '{}': {err}", item.title));
        }
    }
}

/// Route an item's root folder through the configured archive mappings.
/// Matches on the full root path or its top-level segment; anything other
/// than exactly one match refuses the move.
fn resolve_destination(
    settings: &Settings,
    media_type: MediaType,
    root_path: &str,
) -> Option<String> {
    let top_segment = root_path
        .split('/')
        .find(|segment| !segment.is_empty())
        .map(|segment| format!("/{segment}"));

    let matches: Vec<&ArchiveMapping> = settings
        .archive_mappings
        .iter()
        .filter(|mapping| mapping.media_type == media_type)
        .filter(|mapping| {
            let source = mapping.source.trim_end_matches('/');
            source == root_path.trim_end_matches('/')
                || top_segment.as_deref() == Some(source)
        })
        .collect();

    match matches.as_slice() {
        [only] => Some(only.destination.clone()),
        [] => None,
        _ => {
            warn!("Multiple archive mappings match '{root_path}'; refusing to choose");
            None
        }
    }
}

fn push_error(log: &mut Vec<String>, msg: String) {
    error!("{msg}");
    log.push(msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(media_type: MediaType, source: &str, destination: &str) -> ArchiveMapping {
        ArchiveMapping {
            media_type,
            source: source.into(),
            destination: destination.into(),
        }
    }

    #[test]
    fn resolves_by_exact_root_path() {
        let mut settings = Settings::default();
        settings.archive_mappings = vec![mapping(MediaType::Tv, "/tv", "/archive/tv")];

        assert_eq!(
            resolve_destination(&settings, MediaType::Tv, "/tv"),
            Some("/archive/tv".to_string())
        );
    }

    #[test]
    fn resolves_by_top_level_segment() {
        let mut settings = Settings::default();
        settings.archive_mappings = vec![mapping(MediaType::Tv, "/tv", "/archive/tv")];

        assert_eq!(
            resolve_destination(&settings, MediaType::Tv, "/tv/Some Show"),
            Some("/archive/tv".to_string())
        );
    }

    #[test]
    fn wrong_type_mappings_never_match() {
        let mut settings = Settings::default();
        settings.archive_mappings = vec![mapping(MediaType::Movie, "/tv", "/archive/movies")];

        assert_eq!(resolve_destination(&settings, MediaType::Tv, "/tv/Show"), None);
    }

    #[test]
    fn ambiguous_mappings_refuse_to_resolve() {
        let mut settings = Settings::default();
        settings.archive_mappings = vec![
            mapping(MediaType::Tv, "/tv", "/archive/a"),
            mapping(MediaType::Tv, "/tv", "/archive/b"),
        ];

        assert_eq!(resolve_destination(&settings, MediaType::Tv, "/tv/Show"), None);
    }

    #[test]
    fn unmapped_sources_resolve_to_nothing() {
        let settings = Settings::default();
        assert_eq!(resolve_destination(&settings, MediaType::Tv, "/tv/Show"), None);
    }
}
