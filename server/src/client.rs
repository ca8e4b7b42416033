//! Client for a remote execution service.
//!
//! When `EXECUTION_SERVICE_URL` is configured, execution requests are
//! forwarded there with the shared key; health and language queries follow.
//! Transport failures never bubble up as API errors, they come back shaped
//! like execution outcomes so callers see one consistent contract.

use std::time::Duration;

use axum::http::StatusCode;

use praxis_types::{ErrorCode, ExecutionStatus};

use crate::wire::{ExecuteBody, ExecuteResponse, HealthResponse};

/// Generous outer bound; the remote service enforces the real per-request
/// ceiling itself.
const EXECUTE_TIMEOUT: Duration = Duration::from_secs(60);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RemoteExecutor {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl RemoteExecutor {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(EXECUTE_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            http,
        }
    }

    pub async fn execute(&self, body: &ExecuteBody) -> ExecuteResponse {
        let response = self
            .http
            .post(format!("{}/execute", self.base_url))
            .header("X-API-Key", &self.api_key)
            .json(body)
            .send()
            .await;

        match response {
            Ok(response) if response.status() == StatusCode::UNAUTHORIZED => {
                tracing::error!("execution service authentication failed");
                ExecuteResponse::failure(
                    ExecutionStatus::Error,
                    ErrorCode::AuthFailed,
                    "Execution service authentication failed",
                )
            }
            Ok(response) => match response.json::<ExecuteResponse>().await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(error = %e, "execution service returned an invalid body");
                    ExecuteResponse::failure(
                        ExecutionStatus::Error,
                        ErrorCode::ExecutionFailed,
                        "Execution service returned an invalid response",
                    )
                }
            },
            Err(e) if e.is_timeout() => {
                tracing::error!("execution service timed out");
                ExecuteResponse::failure(
                    ExecutionStatus::Timeout,
                    ErrorCode::ExecutionTimeout,
                    format!(
                        "Execution service timed out after {} seconds",
                        EXECUTE_TIMEOUT.as_secs()
                    ),
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to reach execution service");
                ExecuteResponse::failure(
                    ExecutionStatus::Error,
                    ErrorCode::ServiceUnavailable,
                    "Failed to connect to execution service",
                )
            }
        }
    }

    pub async fn health(&self) -> HealthResponse {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;
        match response {
            Ok(response) => response.json::<HealthResponse>().await.unwrap_or_else(|_| {
                HealthResponse {
                    status: "unavailable".to_string(),
                    docker_available: false,
                    languages: Vec::new(),
                }
            }),
            Err(e) => {
                tracing::warn!(error = %e, "execution service health check failed");
                HealthResponse {
                    status: "unavailable".to_string(),
                    docker_available: false,
                    languages: Vec::new(),
                }
            }
        }
    }

    pub async fn languages(&self) -> Vec<String> {
        let response = self
            .http
            .get(format!("{}/languages", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;
        match response {
            Ok(response) => response
                .json::<crate::wire::LanguagesResponse>()
                .await
                .map(|body| body.languages)
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to list remote languages");
                vec!["python".to_string()]
            }
        }
    }
}
