use axum::{extract::State, response::Json};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::AppState;
use crate::logging::LOG_FILE_PREFIX;

/// Connectivity summary for the three upstream systems. The media server
/// gets a live probe; the managers are reported on configuration alone,
/// since every real call degrades gracefully anyway.
pub async fn status_handler(State(state): State<AppState>) -> Json<Value> {
    debug!("Connection status requested");
    let ctx = &state.ctx;

    let media_server = if !ctx.media_server.configured() {
        "Not Configured"
    } else if ctx.media_server.check_connection().await {
        "Connected"
    } else {
        "Error"
    };

    Json(json!({
        "mediaServer": media_server,
        "sonarr": if ctx.sonarr.configured() { "Connected" } else { "Not Configured" },
        "radarr": if ctx.radarr.configured() { "Connected" } else { "Not Configured" },
    }))
}

/// Tail of the most recent application log file, as one string.
pub async fn logs_handler(State(state): State<AppState>) -> Json<String> {
    debug!("Log data requested from UI");

    let Some(path) = newest_log_file(&state.data_dir) else {
        warn!("Log file not found when requesting /api/logs");
        return Json("Log file not found.".to_string());
    };

    match tokio::fs::read_to_string(&path).await {
        Ok(contents) => {
            let lines: Vec<&str> = contents.lines().collect();
            let start = lines.len().saturating_sub(200);
            Json(lines[start..].join("\n"))
        }
        Err(err) => {
            warn!("Error reading log file {}: {err}", path.display());
            Json(format!("An error occurred while reading logs: {err}"))
        }
    }
}

/// The rolling appender writes date-suffixed files; lexicographic max on
/// the suffix is the newest.
fn newest_log_file(data_dir: &std::path::Path) -> Option<std::path::PathBuf> {
    let entries = std::fs::read_dir(data_dir).ok()?;
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX))
        })
        .max()
}
