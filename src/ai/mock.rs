use super::TextGenerator;
use crate::request::GenerationRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted outcome for one mock call.
#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    RemoteError(String),
}

/// In-memory [`TextGenerator`] for tests and dry runs.
///
/// Scripted responses are replayed in order and cycle once exhausted. Every
/// request is recorded so tests can inspect what would have been sent.
#[derive(Clone)]
pub struct MockTextGenerator {
    responses: Arc<Mutex<Vec<Scripted>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.push(Scripted::Text(response.into()));
        self
    }

    /// Script a structured service error, as if the response body carried
    /// `{"error": {"message": ..}}`.
    pub fn with_remote_error(self, message: impl Into<String>) -> Self {
        self.push(Scripted::RemoteError(message.into()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.lock_requests().len()
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.lock_requests().clone()
    }

    fn push(&self, scripted: Scripted) {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(scripted);
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<GenerationRequest>> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, api_key: &str, request: &GenerationRequest) -> Result<String> {
        if api_key.trim().is_empty() {
            return Err(Error::Auth("no API key supplied".to_string()));
        }

        let count = {
            let mut requests = self.lock_requests();
            requests.push(request.clone());
            requests.len()
        };

        let responses = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if responses.is_empty() {
            // Echo the user's text so dry runs show something meaningful.
            let echoed: Vec<&str> = request
                .user_parts()
                .iter()
                .filter_map(|p| p.as_text())
                .collect();
            return Ok(format!("Mock response to: {}", echoed.join(" ")));
        }

        match &responses[(count - 1) % responses.len()] {
            Scripted::Text(text) => Ok(text.clone()),
            Scripted::RemoteError(message) => Err(Error::Remote {
                message: message.clone(),
            }),
        }
    }
}
