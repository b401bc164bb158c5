//! Caller request parsing and validation

use crate::{Error, Result};
use serde::Deserialize;

/// Model used when the caller does not name one.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// The caller's JSON body, as sent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub thinking_level: Option<String>,
}

/// A request that passed validation, with the model resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub model: String,
    pub thinking_level: Option<String>,
}

impl InboundRequest {
    /// Parse a raw request body.
    ///
    /// Malformed JSON and a bare `null` are internal errors (500). Any other
    /// non-object value (array, string, number, boolean) carries no fields,
    /// so it parses as an empty request and later fails prompt validation.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        match value {
            serde_json::Value::Object(_) => Ok(serde_json::from_value(value)?),
            serde_json::Value::Null => Err(Error::Internal(
                "request body must be a JSON object, got null".to_string(),
            )),
            _ => Ok(Self::default()),
        }
    }

    /// Empty strings are treated the same as missing fields.
    pub fn validate(self) -> Result<PromptRequest> {
        let prompt = non_empty(self.prompt).ok_or(Error::InvalidRequest)?;

        Ok(PromptRequest {
            prompt,
            system_prompt: non_empty(self.system_prompt),
            model: non_empty(self.model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            thinking_level: non_empty(self.thinking_level),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
