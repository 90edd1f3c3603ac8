//! Remote text generation.
//!
//! [`TextGenerator`] is the seam between request orchestration and the
//! hosted model: one request in, one generated text out, no retries.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiTextGenerator;
pub use mock::MockTextGenerator;

use crate::request::GenerationRequest;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `request` once and return the generated text.
    async fn generate(&self, api_key: &str, request: &GenerationRequest) -> Result<String>;
}
