//! The request proxy
//!
//! One inbound call maps to at most one upstream call:
//! validate → build payload → call Gemini → map the reply. Every failure along
//! the way is turned into a structured [`ProxyResponse`]; nothing escapes.

pub mod payload;
pub mod request;
pub mod response;

pub use payload::build_payload;
pub use request::{InboundRequest, PromptRequest, DEFAULT_MODEL};
pub use response::ProxyResponse;

use crate::config::CredentialSource;
use crate::error::UPSTREAM_FALLBACK_MESSAGE;
use crate::gemini::{GenerateContentResponse, GenerateContentService, UpstreamReply};
use crate::{Error, Result};
use http::Method;
use std::sync::Arc;

#[derive(Clone)]
pub struct RequestProxy {
    upstream: Arc<dyn GenerateContentService>,
    credentials: Arc<dyn CredentialSource>,
}

impl RequestProxy {
    pub fn new(
        upstream: Arc<dyn GenerateContentService>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            upstream,
            credentials,
        }
    }

    /// Handle one caller request. Always yields a response.
    pub async fn handle(&self, method: &Method, body: &[u8]) -> ProxyResponse {
        match self.try_handle(method, body).await {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    Error::Internal(_) | Error::Http(_) | Error::Serialization(_) | Error::Io(_) => {
                        tracing::error!("Proxy request failed: {}", err)
                    }
                    _ => tracing::debug!("Rejected request ({}): {}", err.status(), err),
                }
                ProxyResponse::from(err)
            }
        }
    }

    async fn try_handle(&self, method: &Method, body: &[u8]) -> Result<ProxyResponse> {
        if method != Method::POST {
            return Err(Error::MethodNotAllowed);
        }

        let api_key = self
            .credentials
            .api_key()
            .ok_or(Error::MisconfiguredServer)?;

        let request = InboundRequest::parse(body)?.validate()?;
        let payload = build_payload(&request);

        let reply = self
            .upstream
            .generate_content(&request.model, &api_key, &payload)
            .await?;

        let response = map_reply(reply, &request.model)?;
        tracing::debug!("Gemini replied for model {}", request.model);
        Ok(response)
    }
}

/// Translate an upstream reply into the caller's response.
pub fn map_reply(reply: UpstreamReply, model: &str) -> Result<ProxyResponse> {
    if !reply.status.is_success() {
        tracing::error!("Gemini API error (status {}): {}", reply.status, reply.body);

        let message = reply
            .body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or(UPSTREAM_FALLBACK_MESSAGE);

        return Err(Error::Upstream {
            status: reply.status,
            message: message.to_string(),
        });
    }

    let response: GenerateContentResponse =
        serde_json::from_value(reply.body).unwrap_or_else(|e| {
            tracing::warn!("Unexpected Gemini response shape: {}", e);
            GenerateContentResponse::default()
        });

    let text = response.first_text().ok_or(Error::EmptyResponse)?;
    Ok(ProxyResponse::success(text, model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticCredentials;
    use crate::gemini::MockGeminiClient;
    use serde_json::json;

    fn proxy_with(mock: Arc<MockGeminiClient>) -> RequestProxy {
        RequestProxy::new(mock, Arc::new(StaticCredentials::new("test-key")))
    }

    fn body_json(response: &ProxyResponse) -> serde_json::Value {
        serde_json::from_str(&response.body).unwrap()
    }

    #[tokio::test]
    async fn test_non_post_is_method_not_allowed() {
        let mock = Arc::new(MockGeminiClient::new());
        let proxy = proxy_with(mock.clone());

        for method in [Method::GET, Method::PUT, Method::DELETE, Method::OPTIONS] {
            let response = proxy.handle(&method, br#"{"prompt":"hi"}"#).await;
            assert_eq!(response.status, 405);
            assert_eq!(body_json(&response), json!({ "error": "Method not allowed" }));
        }
        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_checked_before_body() {
        let mock = Arc::new(MockGeminiClient::new());
        let proxy = RequestProxy::new(mock.clone(), Arc::new(StaticCredentials::missing()));

        for body in [&br#"{"prompt":"hi"}"#[..], &b"{garbage"[..]] {
            let response = proxy.handle(&Method::POST, body).await;
            assert_eq!(response.status, 500);
            assert!(body_json(&response)["error"]
                .as_str()
                .unwrap()
                .contains("GEMINI_API_KEY"));
        }
        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_prompt_is_bad_request() {
        let mock = Arc::new(MockGeminiClient::new());
        let proxy = proxy_with(mock.clone());

        let response = proxy.handle(&Method::POST, b"{}").await;
        assert_eq!(response.status, 400);
        assert_eq!(response.body, r#"{"error":"Prompt is required"}"#);
        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_object_json_is_bad_request() {
        let mock = Arc::new(MockGeminiClient::new());
        let proxy = proxy_with(mock.clone());

        for body in [&b"[]"[..], &b"42"[..], &b"\"hi\""[..], &b"true"[..]] {
            let response = proxy.handle(&Method::POST, body).await;
            assert_eq!(response.status, 400);
            assert_eq!(response.body, r#"{"error":"Prompt is required"}"#);
        }

        let response = proxy.handle(&Method::POST, b"null").await;
        assert_eq!(response.status, 500);
        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_internal_error() {
        let proxy = proxy_with(Arc::new(MockGeminiClient::new()));

        let response = proxy.handle(&Method::POST, b"{\"prompt\": ").await;
        assert_eq!(response.status, 500);

        let message = body_json(&response)["error"].as_str().unwrap().to_string();
        assert!(message.starts_with("Internal server error: "));
        assert!(message.contains("EOF while parsing"));
    }

    #[tokio::test]
    async fn test_success_uses_default_model() {
        let mock = Arc::new(MockGeminiClient::new().with_text_reply("hello"));
        let proxy = proxy_with(mock.clone());

        let response = proxy.handle(&Method::POST, br#"{"prompt":"hi"}"#).await;

        assert_eq!(response.status, 200);
        assert_eq!(
            body_json(&response),
            json!({ "text": "hello", "model": "gemini-3-flash-preview" })
        );
        assert_eq!(response.headers["access-control-allow-origin"], "*");
        assert_eq!(response.headers["content-type"], "application/json");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "gemini-3-flash-preview");
        assert_eq!(calls[0].api_key, "test-key");
    }

    #[tokio::test]
    async fn test_thinking_level_gate_end_to_end() {
        let mock = Arc::new(MockGeminiClient::new());
        let proxy = proxy_with(mock.clone());

        proxy
            .handle(
                &Method::POST,
                br#"{"prompt":"hi","model":"gemini-3-flash-preview","thinkingLevel":"high"}"#,
            )
            .await;
        proxy
            .handle(
                &Method::POST,
                br#"{"prompt":"hi","model":"gemini-1.5-pro","thinkingLevel":"high"}"#,
            )
            .await;

        let calls = mock.calls();
        assert_eq!(calls[0].payload["generationConfig"]["thinking_level"], "high");
        assert!(calls[1].payload["generationConfig"]
            .get("thinking_level")
            .is_none());
        assert_eq!(calls[1].model, "gemini-1.5-pro");
    }

    #[tokio::test]
    async fn test_upstream_error_passes_status_and_message() {
        let mock = Arc::new(MockGeminiClient::new().with_reply(
            429,
            json!({ "error": { "code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED" } }),
        ));
        let proxy = proxy_with(mock);

        let response = proxy.handle(&Method::POST, br#"{"prompt":"hi"}"#).await;
        assert_eq!(response.status, 429);
        assert_eq!(body_json(&response), json!({ "error": "quota exceeded" }));
        assert!(response.headers.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_without_message_uses_fallback() {
        let mock = Arc::new(MockGeminiClient::new().with_reply(503, json!({ "oops": true })));
        let proxy = proxy_with(mock);

        let response = proxy.handle(&Method::POST, br#"{"prompt":"hi"}"#).await;
        assert_eq!(response.status, 503);
        assert_eq!(body_json(&response), json!({ "error": "Gemini API error" }));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_empty_response() {
        let mock = Arc::new(MockGeminiClient::new().with_reply(200, json!({ "candidates": [] })));
        let proxy = proxy_with(mock);

        let response = proxy.handle(&Method::POST, br#"{"prompt":"hi"}"#).await;
        assert_eq!(response.status, 500);
        assert_eq!(body_json(&response), json!({ "error": "No response from Gemini" }));
    }

    #[tokio::test]
    async fn test_odd_success_shape_is_empty_response() {
        let mock = Arc::new(MockGeminiClient::new().with_reply(200, json!({ "candidates": "nope" })));
        let proxy = proxy_with(mock);

        let response = proxy.handle(&Method::POST, br#"{"prompt":"hi"}"#).await;
        assert_eq!(response.status, 500);
        assert_eq!(body_json(&response), json!({ "error": "No response from Gemini" }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_internal_error() {
        let mock = Arc::new(MockGeminiClient::new().with_failure("connection refused"));
        let proxy = proxy_with(mock);

        let response = proxy.handle(&Method::POST, br#"{"prompt":"hi"}"#).await;
        assert_eq!(response.status, 500);
        assert_eq!(
            body_json(&response),
            json!({ "error": "Internal server error: connection refused" })
        );
    }

    #[tokio::test]
    async fn test_repeated_requests_are_byte_identical() {
        let mock = Arc::new(MockGeminiClient::new().with_text_reply("same"));
        let proxy = proxy_with(mock.clone());
        let body = br#"{"prompt":"hi","systemPrompt":"sys"}"#;

        let first = proxy.handle(&Method::POST, body).await;
        let second = proxy.handle(&Method::POST, body).await;

        assert_eq!(first, second);
        let calls = mock.calls();
        assert_eq!(calls[0].payload, calls[1].payload);
    }
}
