use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::models::classification::ClassificationResult;
use crate::models::report::ReportPayload;

/// Status code and raw body text of a report submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Remote report service: waste classification and report submission.
#[allow(async_fn_in_trait)]
pub trait ReportApi {
    /// Classify a base64 photo.
    async fn classify(
        &self,
        image_base64: &str,
    ) -> Result<ClassificationResult, ClassificationServiceError>;

    /// Send one report. The response body is returned unparsed; any status
    /// code is a successful round trip.
    async fn submit_report(&self, payload: &ReportPayload) -> Result<RawResponse, TransportError>;
}

/// HTTP client for the report API, authenticated with a bearer token.
pub struct ReportApiClient {
    http: Client,
    base_url: String,
    token: String,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    image: &'a str,
}

impl ReportApiClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }
}

impl ReportApi for ReportApiClient {
    async fn classify(
        &self,
        image_base64: &str,
    ) -> Result<ClassificationResult, ClassificationServiceError> {
        let url = format!("{}/report/test-classify", self.base_url);
        metrics::counter!("classification_requests_total").increment(1);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&ClassifyRequest {
                image: strip_data_url_prefix(image_base64),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassificationServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let result: ClassificationResult = serde_json::from_str(&text)?;

        tracing::info!(
            label = %result.label,
            confidence = result.confidence,
            is_waste = result.is_waste,
            is_verified_waste = result.is_verified_waste,
            "Classification received"
        );

        Ok(result)
    }

    async fn submit_report(&self, payload: &ReportPayload) -> Result<RawResponse, TransportError> {
        let url = format!("{}/report", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(status, body_len = body.len(), "Report submission response");

        Ok(RawResponse { status, body })
    }
}

/// Drop a `data:image/<type>;base64,` prefix if present.
pub fn strip_data_url_prefix(image: &str) -> &str {
    if let Some(rest) = image.strip_prefix("data:image/") {
        if let Some((kind, data)) = rest.split_once(";base64,") {
            let is_word = !kind.is_empty()
                && kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if is_word {
                return data;
            }
        }
    }
    image
}

#[derive(Debug, thiserror::Error)]
pub enum ClassificationServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse classification response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}
