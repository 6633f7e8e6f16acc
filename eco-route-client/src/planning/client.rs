//! Eco-planning API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::domain::Location;

use super::error::PlanningError;
use super::request::PlanRequest;
use super::session::PlanningBackend;
use super::types::{CompareResponse, HealthResponse, PlanningResult};

/// Default base URL for a locally running backend.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Planning fans out to routing, weather and pollution providers; give it
/// a bounded but generous budget.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration for the eco-planning client.
#[derive(Debug, Clone)]
pub struct EcoApiConfig {
    /// Base URL of the backend
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl EcoApiConfig {
    /// Create a config for the given backend URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for EcoApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Eco-planning API client.
#[derive(Debug, Clone)]
pub struct EcoApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl EcoApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: EcoApiConfig) -> Result<Self, PlanningError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Plan routes for every requested mode, ranked by eco score.
    pub async fn plan(&self, request: &PlanRequest) -> Result<PlanningResult, PlanningError> {
        self.get_json("/eco/plan", &request.query_params()).await
    }

    /// Quick per-mode comparison across all modes.
    pub async fn compare(
        &self,
        start: &Location,
        end: &Location,
    ) -> Result<CompareResponse, PlanningError> {
        self.get_json(
            "/eco/compare",
            &[
                ("start", start.to_query_param()),
                ("end", end.to_query_param()),
            ],
        )
        .await
    }

    /// Backend liveness.
    pub async fn health(&self) -> Result<HealthResponse, PlanningError> {
        self.get_json("/healthz", &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, PlanningError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlanningError::from_response(status.as_u16(), &body));
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| PlanningError::Json {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PlanningBackend for EcoApiClient {
    async fn plan(&self, request: &PlanRequest) -> Result<PlanningResult, PlanningError> {
        EcoApiClient::plan(self, request).await
    }
}
