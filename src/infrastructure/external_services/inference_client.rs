use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::ModelConfig;

#[derive(Debug, Clone)]
pub struct InferenceClientConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub backoff_factor: f64,
}

impl From<&ModelConfig> for InferenceClientConfig {
    fn from(model: &ModelConfig) -> Self {
        Self {
            api_base: model.api_base.clone(),
            api_key: model.api_key.clone(),
            max_retries: model.max_retries,
            timeout_secs: model.timeout_secs,
            backoff_factor: model.backoff_factor,
        }
    }
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("rate limited by the API")]
    RateLimited,

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("invalid API base URL: {0}")]
    InvalidUrl(String),
}

impl InferenceError {
    /// Network failures, 429 and 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            InferenceError::Request(_) | InferenceError::RateLimited => true,
            InferenceError::Status { status, .. } => *status >= 500,
            InferenceError::Parse(_) | InferenceError::InvalidUrl(_) => false,
        }
    }
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    message: String,
}

/// JSON-over-HTTP client for an OpenAI-compatible API, shared by the
/// embedding and chat adapters.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    client: Client,
    config: InferenceClientConfig,
    base: Url,
}

impl InferenceClient {
    pub fn new(config: InferenceClientConfig) -> Result<Self, InferenceError> {
        let mut base = Url::parse(config.api_base.trim())
            .map_err(|e| InferenceError::InvalidUrl(format!("{}: {e}", config.api_base)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(InferenceError::InvalidUrl(config.api_base.clone()));
        }
        // `Url::join` drops the last path segment unless it ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        Ok(Self {
            client,
            config,
            base,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, InferenceError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| InferenceError::InvalidUrl(e.to_string()))
    }

    /// Posts `body` to `path` and decodes the JSON reply, retrying with
    /// exponential backoff on retryable failures.
    pub async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, InferenceError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.execute_request(&url, body).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempts <= self.config.max_retries => {
                    let backoff_time = self.backoff(attempts);
                    warn!(
                        url = %url,
                        attempt = attempts,
                        backoff_ms = backoff_time.as_millis() as u64,
                        error = %e,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(backoff_time).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(
            (self.config.backoff_factor.powi(attempt as i32 - 1) * 1000.0) as u64,
        )
    }

    async fn execute_request<Req, Resp>(&self, url: &Url, body: &Req) -> Result<Resp, InferenceError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let mut request = self.client.post(url.clone()).json(body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.without_url().to_string()))?;

        let status = response.status();
        debug!(url = %url, %status, "inference response");

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(InferenceError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(InferenceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| InferenceError::Parse(e.without_url().to_string()))
    }
}
