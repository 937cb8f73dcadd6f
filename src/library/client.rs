//! HTTP client for the Radarr library manager.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;

use super::models::{AcquisitionRequest, AcquisitionResult, LibraryMovie, LibraryValidationError};
use super::LibraryGateway;
use crate::error::{BridgeError, BridgeResult};

const API_KEY_HEADER: &str = "X-Api-Key";

/// HTTP client for the Radarr v3 API.
pub struct RadarrClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RadarrClient {
    /// Create a new Radarr client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of Radarr (e.g., "http://localhost:7878")
    /// * `api_key` - Radarr API key
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, api_key: String, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn movie_url(&self) -> String {
        format!("{}/api/v3/movie", self.base_url)
    }

    /// List every movie tracked by the library.
    pub async fn list_movies(&self) -> Result<Vec<LibraryMovie>> {
        let response = self
            .client
            .get(self.movie_url())
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .context("Failed to connect to Radarr")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to list Radarr movies: status {}", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse Radarr movie list")
    }

    /// Get the base URL of the library manager.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Turn a rejected add response body into a readable message.
///
/// Radarr answers validation failures with an array of errors; anything else is
/// passed through as-is. `None` means the body could not be read.
fn rejection_detail(status: reqwest::StatusCode, body: Option<&str>) -> String {
    let Some(body) = body else {
        return format!("status {} (response body unreadable)", status);
    };
    if let Ok(errors) = serde_json::from_str::<Vec<LibraryValidationError>>(body) {
        if !errors.is_empty() {
            return errors
                .into_iter()
                .map(|e| e.error_message)
                .collect::<Vec<_>>()
                .join("; ");
        }
    }
    if body.trim().is_empty() {
        format!("status {}", status)
    } else {
        format!("status {}: {}", status, body.trim())
    }
}

#[async_trait]
impl LibraryGateway for RadarrClient {
    async fn list_known_identifiers(&self) -> BridgeResult<HashSet<i64>> {
        let movies = self
            .list_movies()
            .await
            .map_err(|e| BridgeError::LibraryUnavailable(format!("{:#}", e)))?;
        Ok(movies.into_iter().map(|m| m.tmdb_id).collect())
    }

    async fn submit(&self, request: &AcquisitionRequest) -> BridgeResult<AcquisitionResult> {
        let response = self
            .client
            .post(self.movie_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| BridgeError::LibraryUnavailable(format!("Failed to connect to Radarr: {}", e)))?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(
                    "Failed to read Radarr response for {} [{}] (status {}): {}",
                    request.title, request.tmdb_id, status, e
                );
                None
            }
        };

        if !status.is_success() {
            return Err(BridgeError::LibraryRejected {
                tmdb_id: request.tmdb_id,
                detail: rejection_detail(status, body.as_deref()),
            });
        }

        Ok(AcquisitionResult {
            accepted: true,
            detail: format!("{} added with status {}", request.title, status),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = RadarrClient::new("http://localhost:7878".to_string(), "key".to_string(), 30)
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:7878");
        assert_eq!(client.movie_url(), "http://localhost:7878/api/v3/movie");
    }

    #[test]
    fn test_trailing_slash_removal() {
        let client = RadarrClient::new("http://localhost:7878/".to_string(), "key".to_string(), 30)
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:7878");
    }

    #[test]
    fn test_rejection_detail_from_validation_errors() {
        let body = r#"[{"propertyName":"TmdbId","errorMessage":"This movie has already been added"}]"#;
        assert_eq!(
            rejection_detail(reqwest::StatusCode::BAD_REQUEST, Some(body)),
            "This movie has already been added"
        );
    }

    #[test]
    fn test_rejection_detail_fallbacks() {
        assert_eq!(
            rejection_detail(reqwest::StatusCode::UNAUTHORIZED, Some("")),
            "status 401 Unauthorized"
        );
        assert_eq!(
            rejection_detail(reqwest::StatusCode::INTERNAL_SERVER_ERROR, Some("boom")),
            "status 500 Internal Server Error: boom"
        );
    }

    #[test]
    fn test_rejection_detail_with_unreadable_body() {
        assert_eq!(
            rejection_detail(reqwest::StatusCode::BAD_GATEWAY, None),
            "status 502 Bad Gateway (response body unreadable)"
        );
    }

    #[tokio::test]
    async fn test_unreachable_library_maps_to_unavailable() {
        let client = RadarrClient::new("http://127.0.0.1:1".to_string(), "key".to_string(), 2)
            .unwrap();
        let result = client.list_known_identifiers().await;
        assert!(matches!(result, Err(BridgeError::LibraryUnavailable(_))));
    }
}
