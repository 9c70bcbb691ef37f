//! Streamable HTTP transport.
//!
//! A single `POST` route accepts one JSON-RPC message per request:
//!
//! - requests are answered with `200` and an `application/json` body
//!   (protocol errors included, as JSON-RPC error objects)
//! - notifications are acknowledged with `202 Accepted` and no body
//! - unparseable bodies get `400` with a JSON-RPC parse error
//!
//! The transport is stateless. There is no session and no lifecycle gating;
//! every request is answered by the shared [`Dispatcher`] on its own task.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::HttpConfig;
use crate::error::ServerError;
use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::protocol::{parse_message, IncomingMessage, JsonRpcError};
use crate::mcp::shutdown::Shutdown;

/// Builds the router serving `path`.
pub fn router(dispatcher: Arc<Dispatcher>, path: &str, allowed_origins: &[String]) -> Router {
    Router::new()
        .route(path, post(handle_post))
        .layer(cors_layer(allowed_origins))
        .with_state(dispatcher)
}

/// CORS policy: any origin if the list contains `"*"`, else exactly the
/// listed ones. Origins that are not valid header values are skipped.
#[must_use]
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Binds and serves until SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(dispatcher: Arc<Dispatcher>, config: &HttpConfig) -> Result<(), ServerError> {
    let addr = format!("{}:{}", config.host, config.port);
    let mut shutdown = Shutdown::install()?;

    let app = router(dispatcher, &config.path, &config.allowed_origins);

    let listener = TcpListener::bind(addr.as_str())
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!(%addr, path = %config.path, "HTTP transport ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let signal = shutdown.recv().await;
            tracing::info!(signal, "Received signal, initiating graceful shutdown");
        })
        .await
        .map_err(ServerError::Serve)
}

/// Handles one posted JSON-RPC message.
pub async fn handle_post(State(dispatcher): State<Arc<Dispatcher>>, body: String) -> Response {
    match parse_message(&body) {
        Ok(IncomingMessage::Request(req)) => match dispatcher.handle_request(&req).await {
            Ok(response) => Json(response).into_response(),
            Err(error) => Json(error).into_response(),
        },
        Ok(IncomingMessage::Notification(notif)) => {
            tracing::debug!(method = %notif.method, "Accepted notification");
            StatusCode::ACCEPTED.into_response()
        }
        Err(error) => rejected(error),
    }
}

fn rejected(error: JsonRpcError) -> Response {
    tracing::debug!(code = error.error.code, "Rejected HTTP message");
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}
