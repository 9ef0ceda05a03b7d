use crate::config::TibberConfig;
use crate::error::{AppError, Result};
use crate::query::QueryRequest;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Source of raw GraphQL responses
#[async_trait]
pub trait EnergyDataSource: Send + Sync {
    /// Execute one query and return the response body as JSON
    async fn fetch(&self, request: &QueryRequest) -> Result<Value>;
}

/// Tibber GraphQL API client
#[derive(Clone)]
pub struct TibberClient {
    endpoint: String,
    token: String,
    client: Client,
}

impl TibberClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        })
    }

    pub fn from_config(config: &TibberConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl EnergyDataSource for TibberClient {
    async fn fetch(&self, request: &QueryRequest) -> Result<Value> {
        debug!("POST {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Transport(format!(
                "Tibber returned {}: {}",
                status, body
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::Transport(format!("Invalid JSON from Tibber: {}", e)))
    }
}
