use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::info;

use reclaimarr_core::cache::CacheKeys;
use reclaimarr_core::{rules, snapshot};
use reclaimarr_model::{ClassifiedItem, Dashboard, MediaItem};

use crate::AppState;

/// Serve the pre-computed dashboard straight from the cache. Until the
/// first sync lands there is nothing to show, which is a 202, not an
/// error and not an empty payload.
pub async fn dashboard_handler(State(state): State<AppState>) -> Response {
    info!("Dashboard data requested");

    match state.ctx.cache.get::<Dashboard>(CacheKeys::dashboard()) {
        Some(dashboard) => Json(dashboard).into_response(),
        None => {
            info!("Dashboard not yet cached; initial sync may still be running");
            (
                StatusCode::ACCEPTED,
                Json(json!({
                    "message": "Data is being gathered in the background. Please try again in a moment."
                })),
            )
                .into_response()
        }
    }
}

/// The full classified media list, recomputed on demand; bypasses the
/// dashboard cache.
pub async fn content_handler(State(state): State<AppState>) -> Json<Vec<MediaItem>> {
    info!("Full content list requested");

    let settings = state.ctx.settings.load();
    let snapshot = snapshot::build_snapshot(&state.ctx, &settings).await;
    let today = chrono::Utc::now().date_naive();
    let records: Vec<MediaItem> = rules::classify(&snapshot.items, &settings, today)
        .into_iter()
        .map(ClassifiedItem::into_record)
        .collect();

    Json(records)
}
