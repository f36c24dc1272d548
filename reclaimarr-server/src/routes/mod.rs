use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;
use crate::handlers::{actions, content, folders, settings, system, triggers};

/// Create the API router. Route shapes are part of the frontend contract.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(system::status_handler))
        .route("/api/logs", get(system::logs_handler))
        .route("/api/dashboard", get(content::dashboard_handler))
        .route("/api/content", get(content::content_handler))
        .route("/api/content/{id}/action", post(actions::action_handler))
        .route(
            "/api/settings",
            get(settings::get_settings_handler).post(settings::update_settings_handler),
        )
        .route("/api/sync/trigger", post(triggers::sync_trigger_handler))
        .route(
            "/api/cleanup/trigger",
            post(triggers::cleanup_trigger_handler),
        )
        .route(
            "/api/root-folders",
            get(folders::root_folders_by_type_handler),
        )
        .route("/api/root-folders/all", get(folders::all_root_folders_handler))
        .with_state(state)
}
