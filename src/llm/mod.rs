pub mod gemini;
pub mod media;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

pub use gemini::{GeminiClient, GeminiImageConfig};
pub use media::ImagePayload;

#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub image: &'a ImagePayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64, exactly as returned by the provider.
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutput {
    pub image: Option<InlineImage>,
    pub text: Option<String>,
}

impl GenerationOutput {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.text.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("provider request failed with status {status}: {detail}")]
    Status { status: StatusCode, detail: String },
    #[error("provider response could not be decoded: {0}")]
    Decode(String),
    #[error("provider blocked the request for safety: {0}")]
    Blocked(String),
    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
}

/// One external model binding. The fallback chain only sees this trait.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    fn provider(&self) -> &str;

    fn model(&self) -> &str;

    async fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GenerationOutput, ProviderError>;
}
