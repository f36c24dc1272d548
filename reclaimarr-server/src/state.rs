use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use reclaimarr_core::HousekeepingContext;

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<HousekeepingContext>,
    /// Where the settings file and the rotating logs live; the logs
    /// endpoint tails the newest file here.
    pub data_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(ctx: Arc<HousekeepingContext>, data_dir: PathBuf) -> Self {
        Self {
            ctx,
            data_dir: Arc::new(data_dir),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
