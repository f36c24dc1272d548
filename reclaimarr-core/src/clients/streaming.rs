use reclaimarr_model::MediaType;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::UpstreamError;

const SERVICE: &str = "TMDB";
const BASE: &str = "https://api.themoviedb.org/3";

/// Watch-provider lookups against TMDB: a title search followed by a
/// watch-provider query for the best match. One lookup is two network
/// round-trips, which is why the snapshot builder gates calls by size.
#[derive(Debug, Clone)]
pub struct StreamingLookup {
    api_key: Option<String>,
    region: String,
    http: reqwest::Client,
}

impl StreamingLookup {
    pub fn new(api_key: Option<String>, region: String, http: reqwest::Client) -> Self {
        if api_key.is_none() {
            warn!("TMDB API key not configured; streaming availability checks disabled");
        }
        Self {
            api_key,
            region,
            http,
        }
    }

    pub fn configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// All flatrate providers the title is currently available on in the
    /// configured region. Empty when the title cannot be matched or has no
    /// providers; unconfigured clients error so callers can skip the gate
    /// entirely.
    pub async fn providers_for(
        &self,
        media_type: MediaType,
        title: &str,
        year: Option<i32>,
    ) -> Result<Vec<String>, UpstreamError> {
        let Some(tmdb_id) = self.search(media_type, title, year).await? else {
            debug!("No TMDB match for '{title}'");
            return Ok(Vec::new());
        };

        let kind = match media_type {
            MediaType::Tv => "tv",
            MediaType::Movie => "movie",
        };
        let response: ProvidersResponse = self
            .get_json(&format!("{kind}/{tmdb_id}/watch/providers"), &[])
            .await?;

        let providers = response
            .results
            .get(&self.region)
            .map(|region| {
                region
                    .flatrate
                    .iter()
                    .map(|p| p.provider_name.clone())
                    .collect()
            })
            .unwrap_or_default();

        Ok(providers)
    }

    async fn search(
        &self,
        media_type: MediaType,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<u64>, UpstreamError> {
        let mut query = vec![("query", title.to_string())];
        let path = match media_type {
            MediaType::Movie => {
                if let Some(year) = year {
                    query.push(("year", year.to_string()));
                }
                "search/movie"
            }
            MediaType::Tv => {
                if let Some(year) = year {
                    query.push(("first_air_date_year", year.to_string()));
                }
                "search/tv"
            }
        };

        let response: SearchResponse = self.get_json(path, &query).await?;
        Ok(response.results.first().map(|r| r.id))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let Some(api_key) = &self.api_key else {
            return Err(UpstreamError::NotConfigured { service: SERVICE });
        };

        let response = self
            .http
            .get(format!("{BASE}/{path}"))
            .query(&[("api_key", api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|source| UpstreamError::Network {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        response.json().await.map_err(|source| UpstreamError::Decode {
            service: SERVICE,
            source,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct ProvidersResponse {
    #[serde(default)]
    results: std::collections::HashMap<String, RegionProviders>,
}

#[derive(Debug, Deserialize)]
struct RegionProviders {
    #[serde(default)]
    flatrate: Vec<Provider>,
}

#[derive(Debug, Deserialize)]
struct Provider {
    provider_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_payload_decodes_region_flatrate_list() {
        let response: ProvidersResponse = serde_json::from_str(
            r#"{"results": {"US": {"flatrate": [
                {"provider_name": "Netflix"},
                {"provider_name": "Hulu"}
            ]}}}"#,
        )
        .unwrap();

        let names: Vec<_> = response.results["US"]
            .flatrate
            .iter()
            .map(|p| p.provider_name.as_str())
            .collect();
        assert_eq!(names, vec!["Netflix", "Hulu"]);
    }

    #[test]
    fn missing_region_means_no_providers() {
        let response: ProvidersResponse =
            serde_json::from_str(r#"{"results": {"GB": {"flatrate": []}}}"#).unwrap();
        assert!(response.results.get("US").is_none());
    }
}
