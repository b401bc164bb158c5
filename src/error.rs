//! Error handling and custom error types
//!
//! Every failure the proxy can hit is one of these variants. The `Display`
//! output of each variant is exactly what the caller sees in `{"error": ...}`.

use http::StatusCode;
use thiserror::Error;

/// Fallback message when the upstream error payload carries no message.
pub const UPSTREAM_FALLBACK_MESSAGE: &str = "Gemini API error";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error(
        "API key not configured. Please add GEMINI_API_KEY to the server environment variables."
    )]
    MisconfiguredServer,

    #[error("Prompt is required")]
    InvalidRequest,

    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("No response from Gemini")]
    EmptyResponse,

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status code reported to the caller for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::InvalidRequest => StatusCode::BAD_REQUEST,
            Error::Upstream { status, .. } => *status,
            Error::MisconfiguredServer
            | Error::EmptyResponse
            | Error::Internal(_)
            | Error::Http(_)
            | Error::Serialization(_)
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
