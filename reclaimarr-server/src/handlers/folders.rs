use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct FolderQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Root folders for one manager, used by the archive destination dialog.
pub async fn root_folders_by_type_handler(
    State(state): State<AppState>,
    Query(query): Query<FolderQuery>,
) -> Result<Json<Value>, AppError> {
    let folders = match query.kind.as_deref() {
        Some("sonarr") => state.ctx.sonarr.root_folders().await,
        Some("radarr") => state.ctx.radarr.root_folders().await,
        _ => {
            return Err(AppError::bad_request(
                "A 'type' query parameter of 'sonarr' or 'radarr' is required.",
            ));
        }
    }
    .unwrap_or_else(|err| {
        warn!("Error fetching root folders: {err}");
        Vec::new()
    });

    Ok(Json(json!({ "folders": folders })))
}

/// Both managers' root folders in one response, for the settings page's
/// initial load.
pub async fn all_root_folders_handler(State(state): State<AppState>) -> Json<Value> {
    debug!("Combined root folder list requested from UI");

    let sonarr = state.ctx.sonarr.root_folders().await.unwrap_or_else(|err| {
        warn!("Error fetching tv manager root folders: {err}");
        Vec::new()
    });
    let radarr = state.ctx.radarr.root_folders().await.unwrap_or_else(|err| {
        warn!("Error fetching movie manager root folders: {err}");
        Vec::new()
    });

    Json(json!({
        "sonarr": sonarr,
        "radarr": radarr,
    }))
}
