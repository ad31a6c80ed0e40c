//! HTTP endpoint serving the generated document.

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use log::{info, warn};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Document endpoint settings
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    /// Path the document is served at; `/` when empty
    pub api_path: String,
    pub disable_cors: bool,
}

/// Router answering `GET <api_path>` with the document as JSON.
///
/// Unless CORS is disabled, the request `Origin` is echoed in `Access-Control-Allow-Origin`.
/// The document is serialized once, here.
pub fn router(document: &OpenApiDocument, options: &ServeOptions) -> Result<Router> {
    let path = route_path(&options.api_path);
    let body = serde_json::to_vec(document).context("Failed to serialize OpenAPI document")?;
    info!("Serving OpenAPI document at {} ({} bytes)", path, body.len());

    let router = Router::new()
        .route(&path, get(document_handler))
        .with_state(Bytes::from(body));
    if options.disable_cors {
        Ok(router)
    } else {
        Ok(router.layer(CorsLayer::new().allow_origin(AllowOrigin::mirror_request())))
    }
}

async fn document_handler(State(body): State<Bytes>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], body)
}

fn route_path(api_path: &str) -> String {
    let trimmed = api_path.trim();
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Serve the document until Ctrl+C
pub async fn serve(document: OpenApiDocument, options: &ServeOptions, addr: &str) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("Invalid listen address: {}", addr))?;
    let app = router(&document, options)?;

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", err);
        std::future::pending::<()>().await;
    }
}
