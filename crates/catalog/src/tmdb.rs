//! TMDB (The Movie Database) catalog client.
//!
//! Uses TMDB API v3: https://developer.themoviedb.org/docs

use moviefinder_core::languages::{RawLanguage, normalize_languages};
use moviefinder_core::query::{CatalogQuery, DiscoverQuery};
use moviefinder_core::{CatalogResult, Genre, LanguageEntry, RawMovie};
use tracing::{debug, warn};

use crate::provider::Catalog;
use crate::{CatalogError, MovieDetails, Video};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Connection settings. Either credential works; both may be set.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub base_url: String,
    /// v3 key, sent as the `api_key` query parameter.
    pub api_key: Option<String>,
    /// v4 read access token, sent as a bearer token.
    pub access_token: Option<String>,
    pub language: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            access_token: None,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

pub struct TmdbClient {
    config: TmdbConfig,
    client: reqwest::Client,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value, CatalogError> {
        let mut all_params: Vec<(&str, &str)> = vec![("language", self.config.language.as_str())];
        if let Some(ref key) = self.config.api_key {
            all_params.push(("api_key", key.as_str()));
        }
        all_params.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        debug!(url = %url, params = ?params, "TMDB request");

        let mut request = self.client.get(&url).query(&all_params);
        if let Some(ref token) = self.config.access_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "TMDB request failed");
            CatalogError::Unavailable(e.to_string())
        })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound);
        }

        if !resp.status().is_success() {
            warn!(url = %url, status = %resp.status(), "TMDB returned an error status");
            return Err(CatalogError::Unavailable(format!(
                "TMDB returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| CatalogError::Unavailable(format!("parse JSON: {e}")))
    }

    /// List endpoints: a 404 there means the endpoint is broken, not that a
    /// movie is missing.
    async fn get_page(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<CatalogResult, CatalogError> {
        let data = self.get_json(path, params).await.map_err(|e| match e {
            CatalogError::NotFound => CatalogError::Unavailable(format!("{path} not found")),
            other => other,
        })?;
        Ok(parse_page(&data))
    }
}

#[async_trait::async_trait]
impl Catalog for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn get_popular(&self, page: u32) -> Result<CatalogResult, CatalogError> {
        let query = CatalogQuery::Popular { page };
        self.get_page("/movie/popular", &query.to_params()).await
    }

    async fn search_by_text(
        &self,
        text: &str,
        page: u32,
    ) -> Result<CatalogResult, CatalogError> {
        let query = CatalogQuery::Search {
            text: text.to_string(),
            page,
        };
        self.get_page("/search/movie", &query.to_params()).await
    }

    async fn discover_by_facets(
        &self,
        query: &DiscoverQuery,
    ) -> Result<CatalogResult, CatalogError> {
        let params = CatalogQuery::Discover(query.clone()).to_params();
        self.get_page("/discover/movie", &params).await
    }

    async fn get_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let data = self.get_json("/genre/movie/list", &[]).await?;
        Ok(parse_genres(&data))
    }

    async fn get_languages(&self) -> Result<Vec<LanguageEntry>, CatalogError> {
        let data = self.get_json("/configuration/languages", &[]).await?;
        let raw: Vec<RawLanguage> = serde_json::from_value(data)
            .map_err(|e| CatalogError::Unavailable(format!("parse languages: {e}")))?;
        Ok(normalize_languages(&raw))
    }

    async fn get_details(&self, id: &str) -> Result<MovieDetails, CatalogError> {
        let data = self.get_json(&format!("/movie/{}", id.trim()), &[]).await?;
        parse_details(&data)
    }

    async fn get_videos(&self, id: &str) -> Result<Vec<Video>, CatalogError> {
        let data = self
            .get_json(&format!("/movie/{}/videos", id.trim()), &[])
            .await?;
        Ok(parse_videos(&data))
    }
}

fn parse_page(data: &serde_json::Value) -> CatalogResult {
    let results = data["results"].as_array().cloned().unwrap_or_default();
    let items = results
        .into_iter()
        .filter_map(|r| match serde_json::from_value::<RawMovie>(r) {
            Ok(movie) if !movie.id.is_empty() => Some(movie),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "skipping unreadable TMDB result");
                None
            }
        })
        .collect();
    CatalogResult::new(items, data["total_pages"].as_u64().unwrap_or(1))
}

fn parse_genres(data: &serde_json::Value) -> Vec<Genre> {
    data["genres"]
        .as_array()
        .map(|gs| {
            gs.iter()
                .filter_map(|g| {
                    Some(Genre {
                        id: u32::try_from(g["id"].as_u64()?).ok()?,
                        name: g["name"].as_str().unwrap_or("").to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_details(data: &serde_json::Value) -> Result<MovieDetails, CatalogError> {
    let movie: RawMovie = serde_json::from_value(data.clone())
        .map_err(|e| CatalogError::Unavailable(format!("parse details: {e}")))?;
    if movie.id.is_empty() {
        return Err(CatalogError::NotFound);
    }

    Ok(MovieDetails {
        movie,
        tagline: data["tagline"]
            .as_str()
            .filter(|t| !t.is_empty())
            .map(|s| s.to_string()),
        runtime_minutes: data["runtime"]
            .as_u64()
            .filter(|r| *r > 0)
            .and_then(|r| u32::try_from(r).ok()),
        status: data["status"].as_str().map(|s| s.to_string()),
    })
}

fn parse_videos(data: &serde_json::Value) -> Vec<Video> {
    data["results"]
        .as_array()
        .map(|vs| {
            vs.iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
