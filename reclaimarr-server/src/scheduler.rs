use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveTime};
use tracing::{info, warn};

use reclaimarr_core::{HousekeepingContext, cleanup, sync};

/// Local time of the daily cleanup pass.
const CLEANUP_HOUR: u32 = 3;

/// Start the background jobs: one immediate sync so the app has data right
/// away, the fixed-interval sync loop, and the daily cleanup. Tasks are
/// detached; they live as long as the runtime.
pub fn spawn_background_jobs(ctx: Arc<HousekeepingContext>, interval_minutes: u64) {
    let interval_minutes = interval_minutes.max(1);
    info!(
        "Background sync scheduled every {interval_minutes} minutes; daily cleanup at {CLEANUP_HOUR}:00"
    );

    let sync_ctx = Arc::clone(&ctx);
    tokio::spawn(async move {
        // Run once on startup, then settle into the interval.
        sync::run_full_sync(&sync_ctx).await;

        let mut ticker =
            tokio::time::interval(Duration::from_secs(interval_minutes * 60));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await; // the immediate first tick, already spent

        loop {
            ticker.tick().await;
            sync::run_full_sync(&sync_ctx).await;
        }
    });

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(until_next_cleanup()).await;
            info!("Starting scheduled daily cleanup");
            cleanup::perform_cleanup(&ctx, false).await;
        }
    });
}

fn until_next_cleanup() -> Duration {
    let now = Local::now().naive_local();
    let Some(cleanup_time) = NaiveTime::from_hms_opt(CLEANUP_HOUR, 0, 0) else {
        warn!("Invalid cleanup time; retrying in a day");
        return Duration::from_secs(24 * 60 * 60);
    };

    let today_run = now.date().and_time(cleanup_time);
    let next_run = if now < today_run {
        today_run
    } else {
        today_run + chrono::Duration::days(1)
    };

    (next_run - now)
        .to_std()
        .unwrap_or(Duration::from_secs(24 * 60 * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cleanup_is_always_within_a_day() {
        let delay = until_next_cleanup();
        assert!(delay <= Duration::from_secs(24 * 60 * 60));
        assert!(delay > Duration::ZERO);
    }
}
