use super::client::GeminiHttpClient;
use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::ai::TextGenerator;
use crate::request::GenerationRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// [`TextGenerator`] backed by Gemini's `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiTextGenerator {
    http: GeminiHttpClient,
}

impl GeminiTextGenerator {
    pub fn new(model: String, timeout: Duration) -> Self {
        Self::new_with_client(model, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(model: String, timeout: Duration, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(model, timeout, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }
}

#[async_trait]
impl TextGenerator for GeminiTextGenerator {
    async fn generate(&self, api_key: &str, request: &GenerationRequest) -> Result<String> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(Error::Auth("no API key supplied".to_string()));
        }

        tracing::debug!(
            "Generating with {} ({} user parts)",
            self.model(),
            request.user_parts().len()
        );

        let wire = GenerateContentRequest::from(request);
        let response: GenerateContentResponse = self.http.generate_content(api_key, &wire).await?;

        match response.first_text() {
            Some(text) => Ok(text.to_string()),
            None => {
                let reason = response.blocked_reason().unwrap_or("no text in candidates");
                tracing::warn!("Gemini returned no usable text: {}", reason);
                Err(Error::MalformedResponse(format!(
                    "Gemini response contained no text ({})",
                    reason
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::parts::{encode_media, encode_text};
    use crate::request::build;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.5-flash";

    fn make_generator(server: &MockServer, model: &str) -> GeminiTextGenerator {
        GeminiTextGenerator::new(model.to_string(), Duration::from_secs(5))
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_returns_first_text_part() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::text_response("```go\nfunc main(){}\n```")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let generator = make_generator(&server, DEFAULT_MODEL);
        let request = build("sys", vec![encode_text("reverse a string")]);

        let text = generator.generate("test-key", &request).await.unwrap();
        assert_eq!(text, "```go\nfunc main(){}\n```");
    }

    #[tokio::test]
    async fn test_generate_skips_non_text_parts() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [
                            { "executableCode": { "language": "PYTHON", "code": "print(1)" } },
                            { "text": "answer" }
                        ]
                    },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = make_generator(&server, DEFAULT_MODEL);
        let text = generator
            .generate("k", &build("sys", vec![encode_text("run it")]))
            .await
            .unwrap();
        assert_eq!(text, "answer");
    }

    #[tokio::test]
    async fn test_generate_sends_single_user_turn() {
        let server = MockServer::start().await;

        let image = encode_media(&[1, 2, 3], "image/png").unwrap();
        let request = build("describe", vec![encode_text("what is this"), image]);

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(body_json(serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "describe" },
                        { "text": "what is this" },
                        { "inlineData": { "mimeType": "image/png", "data": "AQID" } }
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(test_support::text_response("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let generator = make_generator(&server, "models/gemini-2.5-flash");
        assert_eq!(generator.generate("k", &request).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_structured_error_becomes_remote_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED" }
            })))
            .mount(&server)
            .await;

        let generator = make_generator(&server, DEFAULT_MODEL);
        let err = generator
            .generate("k", &build("sys", Vec::new()))
            .await
            .unwrap_err();

        match err {
            Error::Remote { message } => assert_eq!(message, "quota exceeded"),
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_payload_with_success_status_is_still_an_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": { "message": "model overloaded" }
            })))
            .mount(&server)
            .await;

        let generator = make_generator(&server, DEFAULT_MODEL);
        let err = generator
            .generate("k", &build("sys", Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Remote { ref message } if message == "model overloaded"));
    }

    #[tokio::test]
    async fn test_rejected_key_is_auth_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let generator = make_generator(&server, DEFAULT_MODEL);
        let err = generator
            .generate("bad-key", &build("sys", Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn test_empty_key_fails_without_network_call() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(test_support::text_response("x")))
            .expect(0)
            .mount(&server)
            .await;

        let generator = make_generator(&server, DEFAULT_MODEL);
        let err = generator
            .generate("   ", &build("sys", Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_malformed() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let generator = make_generator(&server, DEFAULT_MODEL);
        let err = generator
            .generate("k", &build("sys", Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_malformed() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let generator = make_generator(&server, DEFAULT_MODEL);
        let err = generator
            .generate("k", &build("sys", Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_server_error_without_payload_is_remote_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let generator = make_generator(&server, DEFAULT_MODEL);
        let err = generator
            .generate("k", &build("sys", Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Remote { .. }));
    }
}
