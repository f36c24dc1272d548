use std::sync::Arc;
use std::time::Duration;

use reclaimarr_config::{EnvConfig, SettingsStore};

use crate::cache::TtlCache;
use crate::clients::{MediaServerClient, RadarrClient, SonarrClient, StreamingLookup};

/// Per-request HTTP timeout for ordinary upstream queries. Bulk move
/// operations override this per call.
const QUERY_TIMEOUT: Duration = Duration::from_secs(15);

/// Everything the housekeeping components need, constructed once at
/// process start and passed by reference. Components never reach for
/// ambient global clients or caches.
#[derive(Debug)]
pub struct HousekeepingContext {
    pub media_server: MediaServerClient,
    pub sonarr: SonarrClient,
    pub radarr: RadarrClient,
    pub streaming: StreamingLookup,
    pub cache: Arc<TtlCache>,
    pub settings: SettingsStore,
    pub archive_drive: Option<String>,
}

impl HousekeepingContext {
    pub fn from_env(env: &EnvConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(QUERY_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            media_server: MediaServerClient::new(
                env.media_server_url.clone(),
                env.media_server_token.clone(),
                http.clone(),
            ),
            sonarr: SonarrClient::new(
                env.sonarr_url.clone(),
                env.sonarr_api_key.clone(),
                http.clone(),
            ),
            radarr: RadarrClient::new(
                env.radarr_url.clone(),
                env.radarr_api_key.clone(),
                http.clone(),
            ),
            streaming: StreamingLookup::new(
                env.tmdb_api_key.clone(),
                env.tmdb_region.clone(),
                http,
            ),
            cache: Arc::new(TtlCache::new()),
            settings: SettingsStore::new(&env.data_dir),
            archive_drive: env.archive_drive.clone(),
        }
    }
}
