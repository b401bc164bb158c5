//! Server-side proxy for the Gemini `generateContent` API
//!
//! Browser code posts a prompt here; the proxy attaches the server-held API
//! key, forwards the request to Gemini and relays the answer (or a structured
//! error) back, so the key never ships to the client.

pub mod config;
pub mod error;
pub mod gemini;
pub mod proxy;
pub mod server;

pub use error::{Error, Result};
