use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::genres::genre_id;
use crate::config::TmdbConfig;

/// Thin client for the TMDB v3 API. Responses are returned as raw JSON and
/// handed to the browser unchanged.
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    language: String,
    region: String,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig) -> Result<Self, TmdbError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            region: config.region.clone(),
        })
    }

    /// `/discover/movie`, optionally narrowed to one genre by name. Unknown
    /// genre names mean no filter.
    pub async fn discover(&self, page: u32, genre: Option<&str>) -> Result<Value, TmdbError> {
        let mut params = vec![
            ("page", page.to_string()),
            ("region", self.region.clone()),
        ];
        if let Some(id) = genre.and_then(genre_id) {
            params.push(("with_genres", id.to_string()));
        }
        self.get("/discover/movie", &params).await
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<Value, TmdbError> {
        let params = vec![("query", query.to_string()), ("page", page.to_string())];
        self.get("/search/movie", &params).await
    }

    pub async fn movie(&self, id: &str) -> Result<Value, TmdbError> {
        self.get(&format!("/movie/{}", urlencoding::encode(id)), &[]).await
    }

    pub async fn videos(&self, id: &str) -> Result<Value, TmdbError> {
        self.get(&format!("/movie/{}/videos", urlencoding::encode(id)), &[])
            .await
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, TmdbError> {
        let api_key = self.api_key.as_deref().ok_or(TmdbError::NotConfigured)?;

        let url = format!("{}{}", self.base_url, path);
        let mut query: Vec<(&str, &str)> = vec![("api_key", api_key), ("language", &self.language)];
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        debug!(url = %url, "TMDB request");

        let response = self.http.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TmdbError::Status(status.as_u16(), path.to_string()));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("TMDB API key not configured")]
    NotConfigured,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("TMDB returned status {0} for {1}")]
    Status(u16, String),
}
