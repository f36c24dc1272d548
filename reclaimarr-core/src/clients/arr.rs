use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::UpstreamError;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Bulk move operations take much longer than queries; they get their own
/// request timeout on top of the client-wide default.
const MOVE_TIMEOUT: Duration = Duration::from_secs(60);

/// Aggregate library numbers reported by one manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySummary {
    pub total_gb: f64,
    pub total_episodes: u64,
    pub total_count: u64,
}

/// Manager root folder as returned by `/api/v3/rootfolder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootFolder {
    pub path: String,
    #[serde(default)]
    pub accessible: Option<bool>,
    #[serde(default)]
    pub free_space: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrStatistics {
    #[serde(default)]
    pub size_on_disk: u64,
    #[serde(default)]
    pub episode_file_count: u64,
}

/// Series record from the tv manager, reduced to the fields the snapshot
/// builder and executor need.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResource {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub root_folder_path: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub statistics: Option<ArrStatistics>,
}

/// Movie record from the movie manager.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieResource {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub root_folder_path: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub size_on_disk: u64,
    #[serde(default)]
    pub movie_file: Option<MovieFile>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieFile {
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct FileSize {
    #[serde(default)]
    size: u64,
}

/// Shared transport for the v3 *arr API family: `X-Api-Key` header auth
/// and JSON bodies.
#[derive(Debug, Clone)]
struct ArrHttp {
    service: &'static str,
    base: String,
    api_key: String,
    http: reqwest::Client,
}

impl ArrHttp {
    fn new(
        service: &'static str,
        base_url: Option<String>,
        api_key: Option<String>,
        http: reqwest::Client,
    ) -> Option<Self> {
        match (base_url, api_key) {
            (Some(base), Some(api_key)) => Some(Self {
                service,
                base: base.trim_end_matches('/').to_string(),
                api_key,
                http,
            }),
            _ => {
                warn!("{service} URL or API key not configured");
                None
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let response = self
            .http
            .get(format!("{}/api/v3/{path}", self.base))
            .header("X-Api-Key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|source| UpstreamError::Network {
                service: self.service,
                source,
            })?;

        self.check_status(response)
            .await?
            .json()
            .await
            .map_err(|source| UpstreamError::Decode {
                service: self.service,
                source,
            })
    }

    async fn put_json(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &Value,
        timeout: Duration,
    ) -> Result<(), UpstreamError> {
        let response = self
            .http
            .put(format!("{}/api/v3/{path}", self.base))
            .header("X-Api-Key", &self.api_key)
            .query(query)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|source| UpstreamError::Network {
                service: self.service,
                source,
            })?;

        self.check_status(response).await.map(|_| ())
    }

    async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, UpstreamError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(UpstreamError::Status {
            service: self.service,
            status,
            body,
        })
    }
}

/// Client for the tv library manager (Sonarr v3 API).
#[derive(Debug, Clone)]
pub struct SonarrClient {
    inner: Option<ArrHttp>,
}

impl SonarrClient {
    const SERVICE: &'static str = "Sonarr";

    pub fn new(base_url: Option<String>, api_key: Option<String>, http: reqwest::Client) -> Self {
        Self {
            inner: ArrHttp::new(Self::SERVICE, base_url, api_key, http),
        }
    }

    pub fn configured(&self) -> bool {
        self.inner.is_some()
    }

    fn http(&self) -> Result<&ArrHttp, UpstreamError> {
        self.inner.as_ref().ok_or(UpstreamError::NotConfigured {
            service: Self::SERVICE,
        })
    }

    pub async fn list_series(&self) -> Result<Vec<SeriesResource>, UpstreamError> {
        self.http()?.get_json("series", &[]).await
    }

    pub async fn root_folders(&self) -> Result<Vec<RootFolder>, UpstreamError> {
        self.http()?.get_json("rootfolder", &[]).await
    }

    /// Total size and episode count via per-series episode-file summation,
    /// which stays accurate when the cached statistics lag behind disk.
    pub async fn library_summary(&self) -> Result<LibrarySummary, UpstreamError> {
        let http = self.http()?;
        let all_series: Vec<SeriesResource> = http.get_json("series", &[]).await?;

        let mut total_bytes: u64 = 0;
        let mut total_episodes: u64 = 0;
        for (i, series) in all_series.iter().enumerate() {
            let files: Vec<FileSize> = http
                .get_json("episodefile", &[("seriesId", series.id.to_string())])
                .await
                .unwrap_or_else(|err| {
                    warn!("Could not fetch episode files for series {}: {err}", series.id);
                    Vec::new()
                });

            total_bytes += files.iter().map(|f| f.size).sum::<u64>();
            total_episodes += files.len() as u64;

            if (i + 1) % 25 == 0 {
                debug!("Processed {}/{} series for size calculation", i + 1, all_series.len());
            }
        }

        let summary = LibrarySummary {
            total_gb: total_bytes as f64 / GIB,
            total_episodes,
            total_count: all_series.len() as u64,
        };
        info!(
            "Sonarr library: {:.2} GB across {} episodes in {} series",
            summary.total_gb, summary.total_episodes, summary.total_count
        );
        Ok(summary)
    }

    /// Point a series at a new root folder and have the manager move the
    /// files. The manager relocates on disk and updates its own tracking
    /// in one operation.
    pub async fn move_series(
        &self,
        series_id: i64,
        destination: &str,
    ) -> Result<String, UpstreamError> {
        let http = self.http()?;
        let mut series: Value = http
            .get_json(&format!("series/{series_id}"), &[])
            .await?;

        let title = series["title"].as_str().unwrap_or("series").to_string();
        series["rootFolderPath"] = json!(destination);
        series["path"] = json!(format!("{}/{}", destination.trim_end_matches('/'), title));

        http.put_json(
            &format!("series/{series_id}"),
            &[("moveFiles", "true".to_string())],
            &series,
            MOVE_TIMEOUT,
        )
        .await?;

        info!("Moved series '{title}' to {destination}");
        Ok(format!("Successfully moved series '{title}'"))
    }
}

/// Client for the movie library manager (Radarr v3 API).
#[derive(Debug, Clone)]
pub struct RadarrClient {
    inner: Option<ArrHttp>,
}

impl RadarrClient {
    const SERVICE: &'static str = "Radarr";

    pub fn new(base_url: Option<String>, api_key: Option<String>, http: reqwest::Client) -> Self {
        Self {
            inner: ArrHttp::new(Self::SERVICE, base_url, api_key, http),
        }
    }

    pub fn configured(&self) -> bool {
        self.inner.is_some()
    }

    fn http(&self) -> Result<&ArrHttp, UpstreamError> {
        self.inner.as_ref().ok_or(UpstreamError::NotConfigured {
            service: Self::SERVICE,
        })
    }

    pub async fn list_movies(&self) -> Result<Vec<MovieResource>, UpstreamError> {
        self.http()?.get_json("movie", &[]).await
    }

    pub async fn root_folders(&self) -> Result<Vec<RootFolder>, UpstreamError> {
        self.http()?.get_json("rootfolder", &[]).await
    }

    /// Total size and count via per-movie file summation; movies without
    /// files are not counted.
    pub async fn library_summary(&self) -> Result<LibrarySummary, UpstreamError> {
        let http = self.http()?;
        let all_movies: Vec<MovieResource> = http.get_json("movie", &[]).await?;

        let mut total_bytes: u64 = 0;
        let mut with_files: u64 = 0;
        for (i, movie) in all_movies.iter().enumerate() {
            let files: Vec<FileSize> = http
                .get_json("moviefile", &[("movieId", movie.id.to_string())])
                .await
                .unwrap_or_else(|err| {
                    warn!("Could not fetch movie files for movie {}: {err}", movie.id);
                    Vec::new()
                });

            if !files.is_empty() {
                total_bytes += files.iter().map(|f| f.size).sum::<u64>();
                with_files += 1;
            }

            if (i + 1) % 25 == 0 {
                debug!("Processed {}/{} movies for size calculation", i + 1, all_movies.len());
            }
        }

        let summary = LibrarySummary {
            total_gb: total_bytes as f64 / GIB,
            total_episodes: 0,
            total_count: with_files,
        };
        info!(
            "Radarr library: {:.2} GB across {} movies with files",
            summary.total_gb, summary.total_count
        );
        Ok(summary)
    }

    pub async fn move_movie(
        &self,
        movie_id: i64,
        destination: &str,
    ) -> Result<String, UpstreamError> {
        let http = self.http()?;
        let mut movie: Value = http.get_json(&format!("movie/{movie_id}"), &[]).await?;

        let title = movie["title"].as_str().unwrap_or("movie").to_string();
        // Preserve the existing folder name when the manager knows it.
        let folder = movie["path"]
            .as_str()
            .and_then(|p| p.rsplit('/').next())
            .filter(|f| !f.is_empty())
            .unwrap_or(&title)
            .to_string();
        movie["rootFolderPath"] = json!(destination);
        movie["path"] = json!(format!("{}/{}", destination.trim_end_matches('/'), folder));

        http.put_json(
            &format!("movie/{movie_id}"),
            &[("moveFiles", "true".to_string())],
            &movie,
            MOVE_TIMEOUT,
        )
        .await?;

        info!("Moved movie '{title}' to {destination}");
        Ok(format!("Successfully moved movie '{title}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_resource_decodes_manager_payload() {
        let series: SeriesResource = serde_json::from_str(
            r#"{
                "id": 12,
                "title": "The Expanse",
                "status": "ended",
                "rootFolderPath": "/tv",
                "path": "/tv/The Expanse",
                "statistics": {"sizeOnDisk": 214748364800, "episodeFileCount": 62}
            }"#,
        )
        .unwrap();

        assert_eq!(series.id, 12);
        assert_eq!(series.status.as_deref(), Some("ended"));
        assert_eq!(series.statistics.unwrap().size_on_disk, 214748364800);
    }

    #[test]
    fn movie_resource_tolerates_missing_file() {
        let movie: MovieResource =
            serde_json::from_str(r#"{"id": 3, "title": "Heat", "year": 1995}"#).unwrap();
        assert_eq!(movie.size_on_disk, 0);
        assert!(movie.movie_file.is_none());
    }

    #[test]
    fn unconfigured_clients_are_inert() {
        let http = reqwest::Client::new();
        let sonarr = SonarrClient::new(None, Some("key".into()), http.clone());
        let radarr = RadarrClient::new(Some("http://radarr:7878".into()), None, http);
        assert!(!sonarr.configured());
        assert!(!radarr.configured());
    }
}
