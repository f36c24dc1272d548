use std::env;
use std::path::PathBuf;

/// Process-level configuration loaded once at startup: upstream endpoints
/// and credentials, bind address, and the persistent data directory.
///
/// Unlike [`Settings`](crate::Settings), none of this is user-editable at
/// runtime; a missing upstream simply leaves that client unconfigured and
/// the service degrades to empty results for it.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Media server (Plex-compatible API)
    pub media_server_url: Option<String>,
    pub media_server_token: Option<String>,

    // Library managers
    pub sonarr_url: Option<String>,
    pub sonarr_api_key: Option<String>,
    pub radarr_url: Option<String>,
    pub radarr_api_key: Option<String>,

    // Streaming availability lookups
    pub tmdb_api_key: Option<String>,
    pub tmdb_region: String,

    // Dedicated archive drive mount, probed separately from MOUNT_POINTS
    pub archive_drive: Option<String>,

    // Persistent data directory (settings file + log files)
    pub data_dir: PathBuf,

    // CORS settings
    pub cors_allowed_origins: Vec<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse()
                .unwrap_or(5001),

            media_server_url: non_empty(env::var("MEDIA_SERVER_URL").ok()),
            media_server_token: non_empty(env::var("MEDIA_SERVER_TOKEN").ok()),

            sonarr_url: non_empty(env::var("SONARR_URL").ok()),
            sonarr_api_key: non_empty(env::var("SONARR_API_KEY").ok()),
            radarr_url: non_empty(env::var("RADARR_URL").ok()),
            radarr_api_key: non_empty(env::var("RADARR_API_KEY").ok()),

            tmdb_api_key: non_empty(env::var("TMDB_API_KEY").ok()),
            tmdb_region: env::var("TMDB_REGION").unwrap_or_else(|_| "US".to_string()),

            archive_drive: non_empty(env::var("ARCHIVE_DRIVE").ok()),

            data_dir: env::var("DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string())
                .into(),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
