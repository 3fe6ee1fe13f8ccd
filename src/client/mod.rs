//! Vulnerability query client.
//!
//! [`VulnerabilitySource`] is the seam between the tool handler and the
//! network. [`OsvClient`] is the only production implementation.
//!
//! Sources never return errors to their caller: every failure collapses into
//! `None`. [`QueryError`] exists so the cause can still be logged.

#[cfg(test)]
pub(crate) mod fake;
mod osv;

pub use osv::OsvClient;

use crate::model::{PackageCoordinate, QueryResponse};
use async_trait::async_trait;
use thiserror::Error;

#[async_trait]
pub trait VulnerabilitySource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Looks up vulnerabilities for `coordinate`.
    ///
    /// Returns `None` on any failure; the cause is not reported.
    async fn query(&self, coordinate: &PackageCoordinate) -> Option<QueryResponse>;
}

/// Why a query produced no usable response.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl QueryError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, QueryError::Transport(e) if e.is_timeout())
    }
}
