//! Gemini `generateContent` payload types.

use crate::models::ContentPart;
use crate::request::GenerationRequest;
use serde::{Deserialize, Serialize};

/// Outbound body: a single user turn.
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl From<&GenerationRequest> for GenerateContentRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: request.outbound_parts(),
            }],
        }
    }
}

/// Outbound content container.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

/// Top-level `generateContent` response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

/// Candidate completion item. Filtered candidates carry no content.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<ResponseContent>,
    pub finish_reason: Option<String>,
}

/// Candidate content as returned by the service.
#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A returned part. Only `text` is read; other kinds such as
/// `executableCode` or `functionCall` are ignored.
#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

/// Structured error payload: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}

impl GenerateContentResponse {
    /// First text part of the first candidate.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.iter().find_map(|p| p.text.as_deref()))
    }

    /// Why no text came back, if the service said.
    pub fn blocked_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
            .or_else(|| {
                self.candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::encode_text;
    use crate::request::build;

    #[test]
    fn test_request_wire_shape() {
        let request = build("be terse", vec![encode_text("hello")]);
        let json = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "text": "be terse" }, { "text": "hello" }]
                }]
            })
        );
    }

    #[test]
    fn test_first_text_skips_inline_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "AA==" } },
                        { "text": "answer" }
                    ]
                }
            }]
        }))
        .unwrap();

        assert_eq!(response.first_text(), Some("answer"));
    }

    #[test]
    fn test_first_text_tolerates_other_part_kinds() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "executableCode": { "language": "PYTHON", "code": "print(1)" } },
                        { "codeExecutionResult": { "outcome": "OUTCOME_OK", "output": "1" } },
                        { "functionCall": { "name": "lookup", "args": {} } },
                        { "text": "answer" }
                    ]
                }
            }]
        }))
        .unwrap();

        assert_eq!(response.first_text(), Some("answer"));
    }

    #[test]
    fn test_filtered_candidate_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();

        assert_eq!(response.first_text(), None);
        assert_eq!(response.blocked_reason(), Some("SAFETY"));
    }
}
