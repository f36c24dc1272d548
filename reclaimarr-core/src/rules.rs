use chrono::{Days, NaiveDate};
use reclaimarr_config::Settings;
use reclaimarr_model::{Classification, ClassifiedItem, MediaItem, RetentionRule};

/// Ended tv below this size is not worth an archive move on its own.
const ENDED_TV_ARCHIVE_MIN_GB: f64 = 8.0;

/// Evaluate the retention rules over a snapshot. Pure: the input is never
/// mutated, `now` is supplied by the caller, and running twice over the
/// same input yields identical results.
pub fn classify(items: &[MediaItem], settings: &Settings, today: NaiveDate) -> Vec<ClassifiedItem> {
    items
        .iter()
        .map(|item| ClassifiedItem {
            item: item.clone(),
            classification: classify_item(item, settings, today),
        })
        .collect()
}

/// First-matching-rule-wins, in this exact order. The order and the
/// 30-day month arithmetic are external contracts; do not reshuffle.
pub fn classify_item(item: &MediaItem, settings: &Settings, today: NaiveDate) -> Classification {
    // 1. Explicit protection beats everything.
    if item.rule == RetentionRule::KeepForever {
        return Classification::Protected;
    }

    // 2. Items the managers do not track are never candidates.
    if item.root_folder_path.is_none() {
        return Classification::NotMonitored {
            reason: "Not tracked by a library manager".to_string(),
        };
    }

    // 3. Large ended series.
    if item.is_tv()
        && item.size >= ENDED_TV_ARCHIVE_MIN_GB
        && item.has_ended()
        && matches!(
            item.rule,
            RetentionRule::ArchiveEnded | RetentionRule::AutoManage
        )
    {
        return Classification::CandidateArchive {
            reason: format!("Ended series at {:.1} GB qualifies for archive", item.size),
        };
    }

    // 4. Available on a preferred streaming service.
    if item.rule == RetentionRule::DeleteIfStreaming && !item.streaming_services.is_empty() {
        return Classification::CandidateDelete {
            reason: format!("Available on {}", item.streaming_services.join(", ")),
        };
    }

    // 5. Not watched within the archive window. Months are a fixed 30
    // days each, not calendar months.
    if matches!(
        item.rule,
        RetentionRule::ArchiveAfterMonths | RetentionRule::AutoManage
    ) && let Some(last_watched) = item.last_watched
    {
        let window_days = (settings.archive_after_months.max(0) as u64) * 30;
        let cutoff = today
            .checked_sub_days(Days::new(window_days))
            .unwrap_or(today);
        if last_watched < cutoff {
            return Classification::CandidateArchive {
                reason: format!(
                    "Not watched since {last_watched} ({} month archive window)",
                    settings.archive_after_months
                ),
            };
        }
    }

    // 6. Watched and then left alone long enough to delete.
    if matches!(
        item.rule,
        RetentionRule::DeleteAfterWatched | RetentionRule::AutoManage
    ) && item.watch_count > 0
        && let Some(last_watched) = item.last_watched
    {
        let cutoff = today
            .checked_sub_days(Days::new(settings.auto_delete_after_days.max(0) as u64))
            .unwrap_or(today);
        if last_watched < cutoff {
            return Classification::CandidateDelete {
                reason: format!(
                    "Watched {} time(s), last on {last_watched}; older than {} days",
                    item.watch_count, settings.auto_delete_after_days
                ),
            };
        }
    }

    // 7. Nothing matched; the source-provided status stands.
    Classification::Active
}
