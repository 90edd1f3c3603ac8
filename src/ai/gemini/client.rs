use super::types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use crate::models::DEFAULT_BASE_URL;
use crate::{Error, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Lightweight Gemini REST client for the `generateContent` endpoint.
///
/// The API key is supplied per call rather than stored, so one client can
/// serve whatever credential the caller currently holds.
#[derive(Clone)]
pub struct GeminiHttpClient {
    client: Client,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` may be given bare (`gemini-2.5-flash`) or with a `models/`
    /// prefix; the prefix is dropped.
    pub fn new(model: String, timeout: Duration) -> Self {
        Self::new_with_client(model, timeout, Client::new())
    }

    pub fn new_with_client(model: String, timeout: Duration, client: Client) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Calls Gemini's `generateContent` endpoint once.
    pub async fn generate_content(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        tracing::debug!("Sending generateContent request to {}", url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            tracing::error!(
                "Gemini API error (status {}): {}",
                status,
                envelope.error.message
            );
            return Err(classify_error(status, envelope));
        }

        if !status.is_success() {
            tracing::error!("Gemini API error (status {}): {}", status, body);
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                return Err(Error::Auth(format!("credential rejected (status {})", status)));
            }
            return Err(Error::Remote {
                message: format!("Gemini API error (status {}): {}", status, body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::MalformedResponse(format!("Failed to parse Gemini response: {}", e))
        })
    }
}

/// Map a structured error payload to either an auth failure or a plain
/// remote error carrying the service's message.
fn classify_error(status: StatusCode, envelope: ErrorEnvelope) -> Error {
    let body = envelope.error;
    let rejected_status = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || matches!(body.code, Some(401) | Some(403));
    let rejected_code = matches!(
        body.status.as_deref(),
        Some("UNAUTHENTICATED") | Some("PERMISSION_DENIED")
    );
    // Gemini answers a malformed key with 400 INVALID_ARGUMENT.
    let rejected_key = body.message.contains("API key not valid");

    if rejected_status || rejected_code || rejected_key {
        Error::Auth(body.message)
    } else {
        Error::Remote {
            message: body.message,
        }
    }
}
