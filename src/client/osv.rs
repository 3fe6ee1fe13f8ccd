use super::{QueryError, VulnerabilitySource};
use crate::config::{Config, DEFAULT_ACCEPT, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::model::{OsvQuery, PackageCoordinate, QueryResponse};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::debug;

/// Queries the OSV.dev `/v1/query` endpoint.
///
/// A new `reqwest::Client` is built for every query and dropped when the
/// query finishes, so no connection state is shared between calls.
#[derive(Debug, Clone)]
pub struct OsvClient {
    endpoint: String,
    user_agent: String,
    accept: String,
    timeout: Duration,
}

impl OsvClient {
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            user_agent: config.user_agent.clone(),
            accept: config.accept.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Performs the query, keeping the failure cause.
    pub async fn try_query(
        &self,
        coordinate: &PackageCoordinate,
    ) -> Result<QueryResponse, QueryError> {
        let client = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout)
            .build()
            .map_err(QueryError::Build)?;

        let response = client
            .post(&self.endpoint)
            .header(ACCEPT, self.accept.as_str())
            .json(&OsvQuery::from(coordinate))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl Default for OsvClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VulnerabilitySource for OsvClient {
    fn name(&self) -> &'static str {
        "OSV.dev"
    }

    async fn query(&self, coordinate: &PackageCoordinate) -> Option<QueryResponse> {
        match self.try_query(coordinate).await {
            Ok(response) => Some(response),
            Err(e) => {
                debug!(
                    package = %coordinate,
                    timeout = e.is_timeout(),
                    error = %e,
                    "OSV query failed"
                );
                None
            }
        }
    }
}
