use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use reclaimarr_core::{cleanup, sync};

use crate::{AppError, AppState};

/// Fire a full sync on a worker task. The single-flight guard turns a
/// racing second trigger into a 429 rather than a queued duplicate.
pub async fn sync_trigger_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    info!("Manual sync triggered by user");

    match sync::spawn_guarded_sync(Arc::clone(&state.ctx)) {
        Ok(()) => Ok((
            StatusCode::ACCEPTED,
            Json(json!({
                "message": "Sync started in the background. Dashboard will update shortly."
            })),
        )),
        Err(_) => {
            info!("Sync request denied: a sync is already in progress");
            Err(AppError::rate_limited(
                "A sync is already in progress. Please wait.",
            ))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRequest {
    #[serde(default)]
    pub dry_run: bool,
}

/// Dry runs are synchronous so the caller can review the proposed actions;
/// live runs are spawned and report through the logs.
pub async fn cleanup_trigger_handler(
    State(state): State<AppState>,
    Json(request): Json<CleanupRequest>,
) -> (StatusCode, Json<Value>) {
    let run_mode = if request.dry_run { "Dry Run" } else { "Live Run" };
    info!("Manual cleanup ({run_mode}) triggered by user");

    if request.dry_run {
        let results = cleanup::perform_cleanup(&state.ctx, true).await;
        return (
            StatusCode::OK,
            Json(json!({
                "message": "Dry run complete. See results below.",
                "results": results,
            })),
        );
    }

    let ctx = Arc::clone(&state.ctx);
    tokio::spawn(async move {
        cleanup::perform_cleanup(&ctx, false).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "Cleanup task started in the background. Check logs for progress."
        })),
    )
}
