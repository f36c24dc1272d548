use std::sync::Arc;

use axum_test::TestServer;
use reclaimarr_config::EnvConfig;
use reclaimarr_core::HousekeepingContext;
use reclaimarr_server::{AppState, routes::create_api_router};
use tempfile::TempDir;

/// A router wired to a context with every upstream unconfigured, backed by
/// a throwaway data directory. Upstream-free endpoints behave exactly as
/// in production; upstream-backed ones degrade the way a fresh install
/// with no environment does.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    // Held so the settings file and logs survive for the test's duration.
    _data_dir: TempDir,
}

pub fn spawn_app() -> TestApp {
    let data_dir = tempfile::tempdir().expect("temp data dir");

    let env = EnvConfig {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        media_server_url: None,
        media_server_token: None,
        sonarr_url: None,
        sonarr_api_key: None,
        radarr_url: None,
        radarr_api_key: None,
        tmdb_api_key: None,
        tmdb_region: "US".to_string(),
        archive_drive: None,
        data_dir: data_dir.path().to_path_buf(),
        cors_allowed_origins: vec![],
    };

    let ctx = Arc::new(HousekeepingContext::from_env(&env));
    let state = AppState::new(Arc::clone(&ctx), env.data_dir.clone());
    let server = TestServer::new(create_api_router(state.clone())).expect("test server");

    TestApp {
        server,
        state,
        _data_dir: data_dir,
    }
}
