//! HTTP client for the `/optimize` endpoint

use crate::config::ClientConfig;
use crate::{OptimizationResult, OptimizerError, SearchRequest};
use reqwest::Client;
use tracing::{debug, error, info, instrument};

/// Client for a remote flight optimizer service
#[derive(Debug, Clone)]
pub struct OptimizerClient {
    http_client: Client,
    base_url: String,
}

impl OptimizerClient {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self, OptimizerError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(OptimizerError::InvalidBaseUrl(base_url));
        }

        debug!(base_url = trimmed, "Creating new optimizer client");
        let http_client = Client::builder()
            .user_agent(concat!("flight-optimizer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            base_url: trimmed.to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, OptimizerError> {
        Self::new(config.api_base.as_str())
    }

    pub fn endpoint(&self) -> String {
        format!("{}/optimize", self.base_url)
    }

    /// Submit one search. No retries; the transport's default timeout applies.
    #[instrument(
        level = "info",
        skip(self, request),
        fields(origin = %request.origin, destinations = request.destinations.len())
    )]
    pub async fn optimize(
        &self,
        request: &SearchRequest,
    ) -> Result<OptimizationResult, OptimizerError> {
        let url = self.endpoint();
        info!(url = %url, currency = %request.currency, "Submitting search to optimizer");

        let start_time = std::time::Instant::now();
        let response = self.http_client.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        info!(
            status = %status,
            duration_ms = start_time.elapsed().as_millis(),
            body_length = body.len(),
            "HTTP request completed"
        );

        if !status.is_success() {
            let detail = extract_detail(&body);
            error!(status = %status, detail = ?detail, "Optimizer request failed");
            return Err(OptimizerError::Remote {
                status: status.as_u16(),
                detail,
            });
        }

        let result: OptimizationResult = serde_json::from_str(&body)?;
        debug!(
            best = %result.best_destination,
            details = result.details.len(),
            "Optimizer response decoded"
        );
        Ok(result)
    }
}

/// Pull a human-readable `detail` string out of an error body.
///
/// Only a non-empty string counts; structured details (lists of validation
/// errors) and non-JSON bodies yield `None`.
pub fn extract_detail(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("detail")?
        .as_str()
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}
