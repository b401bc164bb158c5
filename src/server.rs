//! HTTP adapter: exposes [`RequestProxy`] over axum.

use crate::config::{Config, EnvCredentials};
use crate::gemini::GeminiHttpClient;
use crate::proxy::{ProxyResponse, RequestProxy};
use crate::{Error, Result};
use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::Method,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Path existing browser clients post to.
pub const FUNCTION_PATH: &str = "/.netlify/functions/gemini";
pub const API_PATH: &str = "/api/gemini";

#[derive(Clone)]
pub struct AppState {
    pub proxy: RequestProxy,
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

async fn proxy_request(
    State(state): State<AppState>,
    method: Method,
    body: std::result::Result<Bytes, BytesRejection>,
) -> ProxyResponse {
    match body {
        Ok(body) => state.proxy.handle(&method, &body).await,
        Err(rejection) => {
            tracing::error!("Failed to read request body: {}", rejection);
            ProxyResponse::from(Error::Internal(rejection.body_text()))
        }
    }
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "gemini-proxy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn router(proxy: RequestProxy) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(FUNCTION_PATH, any(proxy_request))
        .route(API_PATH, any(proxy_request))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { proxy })
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    /// Build the production proxy: real Gemini client, key from the process
    /// environment.
    pub async fn build(config: Config) -> Result<Self> {
        let upstream = GeminiHttpClient::new()
            .with_base_url(config.gemini_base_url.clone())
            .with_timeout(config.gemini_timeout);
        let proxy = RequestProxy::new(Arc::new(upstream), Arc::new(EnvCredentials::new()));

        Self::build_with_proxy(config, proxy).await
    }

    pub async fn build_with_proxy(config: Config, proxy: RequestProxy) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            e
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}:{}", config.host, port);

        let server = axum::serve(listener, router(proxy));

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
