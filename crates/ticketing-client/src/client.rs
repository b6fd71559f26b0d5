//! Shared HTTP client for the ticketing backend

use crate::error::{ClientError, ClientResult};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use ticketing_core::ApiConfig;
use ticketing_core::models::ErrorBody;

/// HTTP client bound to one backend
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Build a client with the configured timeouts
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn new(config: ApiConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("ticketing-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Base URL of the backend
    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Absolute URL for a backend path
    pub fn endpoint(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    /// Underlying HTTP client
    pub const fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Extract `detail` from a backend error body
pub(crate) fn error_detail(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|body| body.detail)
        .filter(|detail| !detail.trim().is_empty())
}

/// Decode a JSON response, mapping non-2xx statuses to client errors
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let response = check_status(response).await?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Pass a 2xx response through, otherwise turn it into a client error
pub(crate) async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let detail = error_detail(&body);

    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::NOT_FOUND => {
            ClientError::not_found(detail.unwrap_or_else(|| "Not found".to_string()))
        }
        _ => ClientError::api(
            status.as_u16(),
            detail.unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string()),
        ),
    })
}
