//! Caller-facing response shapes

use crate::Error;
use http::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde::Serialize;

#[derive(Serialize)]
struct SuccessBody<'a> {
    text: &'a str,
    model: &'a str,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Serializing these plain string structs cannot fail.
fn encode<T: Serialize>(body: &T) -> String {
    serde_json::to_string(body).unwrap_or_default()
}

/// Status, headers and serialized JSON body handed back to the caller.
///
/// The body is always either `{"text", "model"}` or `{"error"}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ProxyResponse {
    /// Success carries JSON content type and a wildcard CORS header; the
    /// error shapes carry neither.
    pub fn success(text: &str, model: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

        Self {
            status: StatusCode::OK,
            headers,
            body: encode(&SuccessBody { text, model }),
        }
    }

    pub fn error(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: encode(&ErrorBody { error: message }),
        }
    }
}

impl From<Error> for ProxyResponse {
    fn from(err: Error) -> Self {
        Self::error(err.status(), &err.to_string())
    }
}
