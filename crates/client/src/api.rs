//! REST client for the backend's job endpoints.
//!
//! Wraps the three-endpoint contract every long-running operation
//! follows -- `POST /<operation>` to create a job, `GET
//! /<operation>/status/{job_id}` to poll it, plus the service-wide
//! health probe -- using [`reqwest`].

use std::time::Duration;

use serde::Deserialize;

use copydesk_core::job::{JobSnapshot, JobStatus};
use copydesk_core::operation::OperationKind;

use crate::config::ClientConfig;

/// HTTP client for a single backend.
pub struct JobApi {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

/// Response returned by a creation endpoint after queuing a job.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned identifier for the queued job.
    pub job_id: String,
    /// Initial status echo. Optional -- some deployments return only the id.
    #[serde(default)]
    pub status: Option<JobStatus>,
}

/// Errors from the job REST layer.
#[derive(Debug, thiserror::Error)]
pub enum JobApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description extracted from the response body.
        message: String,
    },

    /// The status endpoint does not (yet) know the job id.
    #[error("Job {job_id} not found")]
    JobNotFound { job_id: String },
}

impl JobApi {
    /// Create a new API client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, JobApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across orchestrator instances).
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            auth_token: config.auth_token.clone(),
        }
    }

    /// Submit a job for execution.
    ///
    /// Sends `POST /<operation>` with the given body. Returns the
    /// server-assigned job id; a 4xx here is a validation rejection and
    /// its message is surfaced verbatim.
    pub async fn submit(
        &self,
        operation: OperationKind,
        body: &serde_json::Value,
    ) -> Result<SubmitResponse, JobApiError> {
        let request = self
            .client
            .post(format!("{}{}", self.base_url, operation.submit_path()))
            .json(body);

        let response = self.authorize(request).send().await?;
        Self::parse_response(response).await
    }

    /// Query the status of a previously submitted job.
    ///
    /// Sends `GET /<operation>/status/{job_id}`. A 404 maps to
    /// [`JobApiError::JobNotFound`] so the poller can count it against
    /// the transient-miss budget.
    pub async fn fetch_status(
        &self,
        operation: OperationKind,
        job_id: &str,
    ) -> Result<JobSnapshot, JobApiError> {
        let request = self
            .client
            .get(format!("{}{}", self.base_url, operation.status_path(job_id)));

        let response = self.authorize(request).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(JobApiError::JobNotFound {
                job_id: job_id.to_string(),
            });
        }
        Self::parse_response(response).await
    }

    /// Probe the service health endpoint (`GET /api/health`).
    pub async fn health(&self) -> Result<(), JobApiError> {
        let response = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    // ---- private helpers ----

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`JobApiError::Api`] carrying
    /// the extracted error message on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, JobApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(JobApiError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, JobApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend returns `{"detail": "..."}` or `{"error": "..."}`; fall
/// back to the raw body when neither parses.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    body.to_string()
}
