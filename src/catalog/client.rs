//! HTTP client for the TMDB metadata catalog.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use super::models::{CatalogItem, MovieCategory, TmdbMovie, TmdbMoviePage};
use super::CatalogGateway;
use crate::error::{BridgeError, BridgeResult};

/// HTTP client for the TMDB v3 API.
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "https://api.themoviedb.org/3")
    /// * `api_key` - TMDB v3 API key
    /// * `language` - Locale for titles and overviews (e.g., "en-US")
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, api_key: String, language: String, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            api_key,
            language,
        })
    }

    /// Get one page of a movie listing.
    pub async fn get_listing(&self, category: MovieCategory) -> Result<Vec<TmdbMovie>> {
        let url = format!("{}/movie/{}", self.base_url, category.as_path());
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
                ("page", "1"),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to fetch {} movies from TMDB", category))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to fetch {} movies: status {}",
                category,
                response.status()
            );
        }

        let page: TmdbMoviePage = response
            .json()
            .await
            .context("Failed to parse movie listing response")?;
        Ok(page.results)
    }

    /// Get a single movie by TMDB id.
    pub async fn get_movie(&self, id: i64) -> Result<TmdbMovie> {
        let url = format!("{}/movie/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .send()
            .await
            .context("Failed to fetch movie from TMDB")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch movie {}: status {}", id, response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse movie response")
    }

    /// Get the base URL of the catalog API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CatalogGateway for TmdbClient {
    async fn fetch(&self, category: MovieCategory) -> BridgeResult<Vec<CatalogItem>> {
        let movies = self
            .get_listing(category)
            .await
            .map_err(|e| BridgeError::CatalogUnavailable(format!("{:#}", e)))?;
        Ok(movies.into_iter().map(CatalogItem::from).collect())
    }

    async fn fetch_detail(&self, id: i64) -> BridgeResult<CatalogItem> {
        self.get_movie(id)
            .await
            .map(CatalogItem::from)
            .map_err(|e| BridgeError::CatalogUnavailable(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = TmdbClient::new(
            "https://api.themoviedb.org/3".to_string(),
            "key".to_string(),
            "en-US".to_string(),
            30,
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://api.themoviedb.org/3");
    }

    #[test]
    fn test_trailing_slash_removal() {
        let client = TmdbClient::new(
            "https://api.themoviedb.org/3/".to_string(),
            "key".to_string(),
            "en-US".to_string(),
            30,
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://api.themoviedb.org/3");
    }

    #[tokio::test]
    async fn test_unreachable_catalog_maps_to_unavailable() {
        let client = TmdbClient::new(
            "http://127.0.0.1:1".to_string(),
            "key".to_string(),
            "en-US".to_string(),
            2,
        )
        .unwrap();

        let result = client.fetch(MovieCategory::Upcoming).await;
        assert!(matches!(result, Err(BridgeError::CatalogUnavailable(_))));
    }
}
