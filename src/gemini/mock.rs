use super::types::GenerateContentRequest;
use super::{GenerateContentService, UpstreamReply};
use crate::{Error, Result};
use async_trait::async_trait;
use http::StatusCode;
use std::sync::{Arc, Mutex};

/// One call observed by [`MockGeminiClient`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub api_key: String,
    /// The request as it would go over the wire.
    pub payload: serde_json::Value,
}

enum MockReply {
    Reply(UpstreamReply),
    Failure(String),
}

pub struct MockGeminiClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockGeminiClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_reply(self, status: u16, body: serde_json::Value) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Reply(UpstreamReply { status, body }));
        self
    }

    /// Successful reply whose first candidate carries `text`.
    pub fn with_text_reply(self, text: &str) -> Self {
        self.with_reply(
            200,
            serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": text }] } }]
            }),
        )
    }

    /// Simulates a transport failure (connection refused, reset, ...).
    pub fn with_failure(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Failure(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockGeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerateContentService for MockGeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<UpstreamReply> {
        let payload = serde_json::to_value(request)?;
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                model: model.to_string(),
                api_key: api_key.to_string(),
                payload,
            });
            calls.len() - 1
        };

        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Ok(UpstreamReply {
                status: StatusCode::OK,
                body: serde_json::json!({
                    "candidates": [{ "content": { "parts": [{ "text": "mock response" }] } }]
                }),
            });
        }

        match &replies[index % replies.len()] {
            MockReply::Reply(reply) => Ok(reply.clone()),
            MockReply::Failure(message) => Err(Error::Internal(message.clone())),
        }
    }
}
