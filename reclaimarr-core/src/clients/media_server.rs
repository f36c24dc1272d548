use chrono::NaiveDate;
use reclaimarr_model::MediaType;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::UpstreamError;

const SERVICE: &str = "media server";

/// Client for the media server's Plex-compatible HTTP API. The server is
/// the source of watch history and the authority for deletions; library
/// locations and lifecycle state come from the managers instead.
#[derive(Debug, Clone)]
pub struct MediaServerClient {
    base: Option<Url>,
    token: Option<String>,
    http: reqwest::Client,
}

impl MediaServerClient {
    pub fn new(
        base_url: Option<String>,
        token: Option<String>,
        http: reqwest::Client,
    ) -> Self {
        // A trailing slash keeps Url::join appending instead of replacing
        // the last path segment when the server lives under a subpath.
        let base = base_url.and_then(|raw| match Url::parse(&format!("{}/", raw.trim_end_matches('/'))) {
            Ok(url) => Some(url),
            Err(err) => {
                warn!("Ignoring invalid media server URL: {err}");
                None
            }
        });

        if base.is_none() || token.is_none() {
            warn!("Media server URL or token not configured");
        }

        Self { base, token, http }
    }

    pub fn configured(&self) -> bool {
        self.base.is_some() && self.token.is_some()
    }

    /// Cheap connectivity probe for the status endpoint.
    pub async fn check_connection(&self) -> bool {
        let Ok(request) = self.request(reqwest::Method::GET, "identity") else {
            return false;
        };
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                warn!("Media server connection check failed: {err}");
                false
            }
        }
    }

    /// Every movie and show across all library sections, normalized.
    pub async fn fetch_library(&self) -> Result<Vec<ServerLibraryEntry>, UpstreamError> {
        let sections: SectionsResponse = self.get_json("library/sections").await?;

        let mut entries = Vec::new();
        for section in sections.container.directories {
            let media_type = match section.kind.as_str() {
                "movie" => MediaType::Movie,
                "show" => MediaType::Tv,
                other => {
                    debug!("Skipping library section '{}' of type {other}", section.title);
                    continue;
                }
            };

            let path = format!("library/sections/{}/all", section.key);
            let items: ItemsResponse = self.get_json(&path).await?;
            entries.extend(
                items
                    .container
                    .metadata
                    .into_iter()
                    .map(|raw| raw.normalize(media_type)),
            );
        }

        Ok(entries)
    }

    /// Ask the media server to remove an item by id.
    pub async fn delete_item(&self, id: &str) -> Result<(), UpstreamError> {
        let path = format!("library/metadata/{id}");
        let response = self
            .request(reqwest::Method::DELETE, &path)?
            .send()
            .await
            .map_err(|source| UpstreamError::Network {
                service: SERVICE,
                source,
            })?;

        check_status(response).await.map(|_| ())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, UpstreamError> {
        let response = self
            .request(reqwest::Method::GET, path)?
            .send()
            .await
            .map_err(|source| UpstreamError::Network {
                service: SERVICE,
                source,
            })?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|source| UpstreamError::Decode {
                service: SERVICE,
                source,
            })
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, UpstreamError> {
        let (Some(base), Some(token)) = (&self.base, &self.token) else {
            return Err(UpstreamError::NotConfigured { service: SERVICE });
        };

        let url = base
            .join(path)
            .map_err(|source| UpstreamError::BadBaseUrl {
                service: SERVICE,
                source,
            })?;

        Ok(self
            .http
            .request(method, url)
            .header("X-Plex-Token", token)
            .header(reqwest::header::ACCEPT, "application/json"))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(UpstreamError::Status {
        service: SERVICE,
        status,
        body,
    })
}

/// One media-server library entry in normalized form.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerLibraryEntry {
    pub id: String,
    pub title: String,
    pub media_type: MediaType,
    pub year: Option<i32>,
    pub last_watched: Option<NaiveDate>,
    pub watch_count: u32,
    /// The server's own file-size metadata; the snapshot builder prefers
    /// the library manager's on-disk numbers when a cross-reference exists.
    pub size_bytes: u64,
    pub file_path: Option<String>,
    pub seasons: u32,
    pub episodes: u32,
}

#[derive(Debug, Deserialize)]
struct SectionsResponse {
    #[serde(rename = "MediaContainer")]
    container: SectionsContainer,
}

#[derive(Debug, Deserialize)]
struct SectionsContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<SectionDirectory>,
}

#[derive(Debug, Deserialize)]
struct SectionDirectory {
    key: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct ItemsResponse {
    #[serde(rename = "MediaContainer")]
    container: ItemsContainer,
}

#[derive(Debug, Deserialize)]
struct ItemsContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<RawMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(rename = "ratingKey")]
    rating_key: String,
    title: String,
    #[serde(default)]
    year: Option<i32>,
    #[serde(rename = "lastViewedAt", default)]
    last_viewed_at: Option<i64>,
    #[serde(rename = "viewCount", default)]
    view_count: u32,
    #[serde(rename = "childCount", default)]
    child_count: u32,
    #[serde(rename = "leafCount", default)]
    leaf_count: u32,
    #[serde(rename = "Media", default)]
    media: Vec<RawMedia>,
    #[serde(rename = "Location", default)]
    locations: Vec<RawLocation>,
}

#[derive(Debug, Deserialize)]
struct RawMedia {
    #[serde(rename = "Part", default)]
    parts: Vec<RawPart>,
}

#[derive(Debug, Deserialize)]
struct RawPart {
    #[serde(default)]
    size: u64,
    #[serde(default)]
    file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    path: String,
}

impl RawMetadata {
    fn normalize(self, media_type: MediaType) -> ServerLibraryEntry {
        let primary_part = self.media.first().and_then(|m| m.parts.first());
        let file_path = match media_type {
            MediaType::Movie => primary_part.and_then(|p| p.file.clone()),
            MediaType::Tv => self.locations.first().map(|l| l.path.clone()),
        };

        ServerLibraryEntry {
            id: self.rating_key,
            title: self.title,
            media_type,
            year: self.year,
            last_watched: self
                .last_viewed_at
                .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
                .map(|dt| dt.date_naive()),
            watch_count: self.view_count,
            size_bytes: primary_part.map(|p| p.size).unwrap_or(0),
            file_path,
            seasons: self.child_count,
            episodes: self.leaf_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_movie_metadata_with_file_part() {
        let raw: ItemsResponse = serde_json::from_str(
            r#"{"MediaContainer": {"Metadata": [{
                "ratingKey": "42",
                "title": "Dune",
                "year": 2021,
                "lastViewedAt": 1700000000,
                "viewCount": 2,
                "Media": [{"Part": [{"size": 16106127360, "file": "/movies/Dune/Dune.mkv"}]}]
            }]}}"#,
        )
        .unwrap();

        let entry = raw
            .container
            .metadata
            .into_iter()
            .next()
            .unwrap()
            .normalize(MediaType::Movie);

        assert_eq!(entry.id, "42");
        assert_eq!(entry.size_bytes, 16106127360);
        assert_eq!(entry.file_path.as_deref(), Some("/movies/Dune/Dune.mkv"));
        assert_eq!(entry.last_watched, Some(NaiveDate::from_ymd_opt(2023, 11, 14).unwrap()));
    }

    #[test]
    fn normalizes_show_metadata_from_location() {
        let raw: ItemsResponse = serde_json::from_str(
            r#"{"MediaContainer": {"Metadata": [{
                "ratingKey": "7",
                "title": "Severance",
                "childCount": 2,
                "leafCount": 19,
                "Location": [{"path": "/tv/Severance"}]
            }]}}"#,
        )
        .unwrap();

        let entry = raw
            .container
            .metadata
            .into_iter()
            .next()
            .unwrap()
            .normalize(MediaType::Tv);

        assert_eq!(entry.seasons, 2);
        assert_eq!(entry.episodes, 19);
        assert_eq!(entry.file_path.as_deref(), Some("/tv/Severance"));
        assert_eq!(entry.watch_count, 0);
        assert_eq!(entry.last_watched, None);
    }

    #[test]
    fn unconfigured_client_reports_not_configured() {
        let client = MediaServerClient::new(None, None, reqwest::Client::new());
        assert!(!client.configured());
        let err = client
            .request(reqwest::Method::GET, "identity")
            .unwrap_err();
        assert!(matches!(err, UpstreamError::NotConfigured { .. }));
    }
}
