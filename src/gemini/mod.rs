//! Gemini `generateContent` integration
//!
//! The proxy only ever talks to the upstream through [`GenerateContentService`],
//! so tests can swap the HTTP client for [`MockGeminiClient`].

pub mod client;
pub mod mock;
pub mod types;

pub use client::GeminiHttpClient;
pub use mock::MockGeminiClient;
pub use types::{GenerateContentRequest, GenerateContentResponse};

use crate::Result;
use async_trait::async_trait;
use http::StatusCode;

/// Raw upstream answer: the status plus the decoded JSON body.
///
/// Non-success statuses are returned here rather than as errors, so the
/// caller can relay the upstream status and message.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

#[async_trait]
pub trait GenerateContentService: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<UpstreamReply>;
}
