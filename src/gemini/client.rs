use super::types::GenerateContentRequest;
use super::{GenerateContentService, UpstreamReply};
use crate::config::DEFAULT_BASE_URL;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Gemini REST client for `generateContent`.
///
/// The API key is passed per call and sent as the `key` query parameter.
#[derive(Debug, Clone)]
pub struct GeminiHttpClient {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl GeminiHttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for GeminiHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerateContentService for GeminiHttpClient {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<UpstreamReply> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        );

        tracing::debug!("Sending generateContent request to Gemini (model {})", model);

        let mut builder = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        // reqwest errors can carry the full URL, which includes the key.
        let response = builder.send().await.map_err(|e| {
            let e = e.without_url();
            tracing::error!("Failed to send request to Gemini: {}", e);
            e
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| e.without_url())?;
        let body = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                "Failed to parse Gemini response (status {}): {}\nBody: {}",
                status,
                e,
                text
            );
            e
        })?;

        Ok(UpstreamReply { status, body })
    }
}
