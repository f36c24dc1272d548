use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use reclaimarr_core::actions::{self, Action};
use reclaimarr_model::MediaItem;

use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action: String,
    pub item: MediaItem,
    #[serde(default)]
    pub archive_path: Option<String>,
}

/// Route a user-confirmed action to the executor. Validation failures map
/// to client errors before anything is mutated; upstream failures are
/// surfaced, not retried.
pub async fn action_handler(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<Value>, AppError> {
    info!(
        "Action '{}' requested for item '{}' (id {media_id})",
        request.action, request.item.title
    );

    let action = Action::parse(&request.action)?;
    let message = actions::execute(
        &state.ctx,
        action,
        &request.item,
        request.archive_path.as_deref(),
    )
    .await?;

    Ok(Json(json!({
        "status": "success",
        "message": message,
    })))
}
