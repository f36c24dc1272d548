use axum::{extract::State, response::Json};
use tracing::{debug, info};

use reclaimarr_config::{Settings, SettingsOverlay};

use crate::{AppError, AppState};

pub async fn get_settings_handler(State(state): State<AppState>) -> Json<Settings> {
    debug!("Settings data requested");
    Json(state.ctx.settings.load())
}

/// Replace the persisted user settings with the posted object, verbatim.
/// The response echoes the settings back with the environment-sourced
/// available-provider list layered in, so the settings page always shows
/// what can actually be selected.
pub async fn update_settings_handler(
    State(state): State<AppState>,
    Json(mut settings): Json<Settings>,
) -> Result<Json<Settings>, AppError> {
    info!("Saving settings");
    state.ctx.settings.save(&settings)?;

    if let Some(available) = SettingsOverlay::from_env().available_streaming_providers {
        settings.available_streaming_providers = available;
    }

    Ok(Json(settings))
}
