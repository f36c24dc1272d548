use reclaimarr_model::{MediaItem, MediaType};
use tracing::{error, info};

use crate::cache::CacheKeys;
use crate::context::HousekeepingContext;
use crate::error::ActionError;

/// User- or automation-selected operation on one media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Delete,
    Archive,
}

impl Action {
    pub fn parse(raw: &str) -> Result<Self, ActionError> {
        match raw {
            "delete" => Ok(Action::Delete),
            "archive" => Ok(Action::Archive),
            other => Err(ActionError::UnknownAction(other.to_string())),
        }
    }
}

/// Execute a confirmed action. Fails closed: every precondition is checked
/// before any filesystem or upstream mutation, and a validation failure
/// means nothing was touched. On success the affected caches are
/// invalidated so the next read rebuilds from the real state.
pub async fn execute(
    ctx: &HousekeepingContext,
    action: Action,
    item: &MediaItem,
    archive_path: Option<&str>,
) -> Result<String, ActionError> {
    info!("Action {action:?} requested for '{}'", item.title);

    let message = match action {
        Action::Delete => {
            ctx.media_server.delete_item(&item.id).await?;
            format!("Removed '{}' from the media server", item.title)
        }
        Action::Archive => archive(ctx, item, archive_path).await?,
    };

    invalidate_media_caches(ctx);
    Ok(message)
}

async fn archive(
    ctx: &HousekeepingContext,
    item: &MediaItem,
    archive_path: Option<&str>,
) -> Result<String, ActionError> {
    let media_type = item.media_type();
    let settings = ctx.settings.load();
    let allowed = settings.archive_folders_for(media_type);

    let destination = match archive_path {
        Some(path) if !path.trim().is_empty() => path,
        _ => {
            error!("Archive failed for '{}': no destination selected", item.title);
            return Err(ActionError::MissingDestination);
        }
    };

    if allowed.is_empty() {
        error!("Archive failed for '{}': no archive folders configured", item.title);
        return Err(ActionError::NoConfiguredFolders { media_type });
    }

    if !allowed.iter().any(|folder| folder == destination) {
        error!(
            "Archive failed for '{}': '{destination}' is not an allow-listed folder",
            item.title
        );
        return Err(ActionError::DestinationNotAllowed);
    }

    if item.file_path.as_deref().is_none_or(str::is_empty) {
        return Err(ActionError::MissingFilePath);
    }

    let Some(manager_id) = item.kind.manager_id() else {
        return Err(ActionError::MissingManagerId { media_type });
    };

    // The manager move both relocates the files and updates its tracked
    // root folder.
    let message = match media_type {
        MediaType::Tv => ctx.sonarr.move_series(manager_id, destination).await?,
        MediaType::Movie => ctx.radarr.move_movie(manager_id, destination).await?,
    };

    Ok(message)
}

/// Drop the caches whose contents the action just falsified. The next
/// snapshot rebuild is the authority on the item's new state.
fn invalidate_media_caches(ctx: &HousekeepingContext) {
    ctx.cache.delete(CacheKeys::dashboard());
    ctx.cache.delete(CacheKeys::snapshot());
    ctx.cache.delete(CacheKeys::classified());
}

#[cfg(test)]
mod tests {
    use super::*;
    use reclaimarr_config::EnvConfig;
    use reclaimarr_model::{MediaKind, RetentionRule};

    fn test_ctx() -> HousekeepingContext {
        let env = EnvConfig {
            server_host: "127.0.0.1".into(),
            server_port: 0,
            media_server_url: None,
            media_server_token: None,
            sonarr_url: None,
            sonarr_api_key: None,
            radarr_url: None,
            radarr_api_key: None,
            tmdb_api_key: None,
            tmdb_region: "US".into(),
            archive_drive: None,
            data_dir: tempfile::tempdir().unwrap().keep(),
            cors_allowed_origins: vec![],
        };
        HousekeepingContext::from_env(&env)
    }

    fn movie() -> MediaItem {
        MediaItem {
            id: "9".into(),
            title: "Blade Runner".into(),
            kind: MediaKind::Movie {
                year: Some(1982),
                radarr_id: Some(4),
            },
            size: 30.0,
            last_watched: None,
            watch_count: 0,
            status: Some("active".into()),
            rule: RetentionRule::AutoManage,
            streaming_services: vec![],
            file_path: Some("/movies/Blade Runner/BR.mkv".into()),
            root_folder_path: Some("/movies".into()),
            reason: None,
        }
    }

    #[tokio::test]
    async fn archive_without_destination_fails_closed() {
        let ctx = test_ctx();
        let err = execute(&ctx, Action::Archive, &movie(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::MissingDestination));
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn archive_without_configured_folders_fails_closed() {
        let ctx = test_ctx();
        let err = execute(&ctx, Action::Archive, &movie(), Some("/archive/movies"))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NoConfiguredFolders { .. }));
    }

    #[tokio::test]
    async fn archive_rejects_destination_outside_allow_list() {
        let ctx = test_ctx();
        let mut settings = ctx.settings.load();
        settings.movie_archive_folders = vec!["/archive/movies".into()];
        ctx.settings.save(&settings).unwrap();

        // A perfectly valid filesystem path, just not allow-listed.
        let err = execute(&ctx, Action::Archive, &movie(), Some("/tmp"))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::DestinationNotAllowed));
    }

    #[tokio::test]
    async fn archive_requires_a_known_file_path() {
        let ctx = test_ctx();
        let mut settings = ctx.settings.load();
        settings.movie_archive_folders = vec!["/archive/movies".into()];
        ctx.settings.save(&settings).unwrap();

        let mut item = movie();
        item.file_path = None;
        let err = execute(&ctx, Action::Archive, &item, Some("/archive/movies"))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::MissingFilePath));
    }

    #[tokio::test]
    async fn validation_happens_before_any_upstream_call() {
        // With all preconditions met but no manager configured, the failure
        // is the upstream layer refusing, not a panic or silent no-op.
        let ctx = test_ctx();
        let mut settings = ctx.settings.load();
        settings.movie_archive_folders = vec!["/archive/movies".into()];
        ctx.settings.save(&settings).unwrap();

        let err = execute(&ctx, Action::Archive, &movie(), Some("/archive/movies"))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Upstream(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn unknown_actions_are_rejected() {
        assert!(matches!(
            Action::parse("transmogrify"),
            Err(ActionError::UnknownAction(_))
        ));
        assert_eq!(Action::parse("delete").unwrap(), Action::Delete);
        assert_eq!(Action::parse("archive").unwrap(), Action::Archive);
    }
}
