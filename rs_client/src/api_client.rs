//! HTTP client for the résumé scoring service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use resume_screen::analysis::AnalysisRequest;
use resume_screen::ports::{ScoringError, ScoringResult, ScoringService};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Default request timeout; analyses of several PDFs can take a while.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body kept in a [`ScoringError::Status`] message.
const MAX_ERROR_BODY: usize = 200;

/// Client for the scoring service (`POST /analyze`, `GET /eligible/{email}`).
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    message: String,
}

impl ApiClient {
    /// Create a client with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Health probe against `GET /`. Returns the service's greeting.
    pub async fn ping(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .context("Failed to reach scoring service")?;

        if !response.status().is_success() {
            anyhow::bail!("Scoring service health check failed: {}", response.status());
        }

        let health: HealthResponse = response
            .json()
            .await
            .context("Failed to parse health response")?;

        Ok(health.message)
    }

    /// `{base}/eligible/{email}` with the email percent-encoded as a single
    /// path segment.
    fn eligible_url(&self, email: &str) -> ScoringResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ScoringError::Unavailable(format!("invalid scoring URL: {e}")))?;

        url.path_segments_mut()
            .map_err(|()| ScoringError::Unavailable("scoring URL cannot take a path".into()))?
            .pop_if_empty()
            .extend(["eligible", email]);

        Ok(url)
    }

    fn form(request: &AnalysisRequest) -> ScoringResult<Form> {
        let mut form = Form::new()
            .text("job_description", request.job_description.clone())
            .text("hr_email", request.hr_email.clone());

        for file in &request.files {
            let part = Part::bytes(file.bytes().to_vec())
                .file_name(file.name().to_string())
                .mime_str(file.media_type())
                .map_err(|e| ScoringError::Unavailable(format!("invalid media type: {e}")))?;
            form = form.part("resumes", part);
        }

        Ok(form)
    }
}

#[async_trait]
impl ScoringService for ApiClient {
    async fn analyze(&self, request: &AnalysisRequest) -> ScoringResult<Value> {
        tracing::debug!(files = request.files.len(), "submitting analysis");

        let response = self
            .client
            .post(format!("{}/analyze", self.base_url))
            .multipart(Self::form(request)?)
            .send()
            .await
            .map_err(unreachable)?;

        read_json(response).await
    }

    async fn eligible(&self, email: &str) -> ScoringResult<Value> {
        let response = self
            .client
            .get(self.eligible_url(email)?)
            .send()
            .await
            .map_err(unreachable)?;

        read_json(response).await
    }
}

fn unreachable(err: reqwest::Error) -> ScoringError {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };
    ScoringError::Unavailable(reason)
}

/// Map a response to JSON, a status error, or a malformed-body error.
async fn read_json(response: Response) -> ScoringResult<Value> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("Unknown error").to_string()
        } else {
            truncate(body.trim(), MAX_ERROR_BODY)
        };
        return Err(ScoringError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ScoringError::Malformed(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| ScoringError::Malformed(e.to_string()))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_eligible_url_encodes_email() {
        let client = ApiClient::new("http://localhost:8000").unwrap();

        let url = client.eligible_url("hr+jobs@example.com").unwrap();
        assert_eq!(url.path(), "/eligible/hr+jobs@example.com");

        let url = client.eligible_url("a/b@example.com").unwrap();
        assert_eq!(url.path(), "/eligible/a%2Fb@example.com");
    }

    #[test]
    fn test_eligible_url_keeps_base_path() {
        let client = ApiClient::new("http://localhost:8000/api/").unwrap();
        let url = client.eligible_url("hr@example.com").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/eligible/hr@example.com");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }
}
