//! HTTP transport: `POST /rpc` binding with request logging and `/health`.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json as AxumJson, Response},
    routing::{any, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use rpc_dispatch::{ErrorObject, Reply, RequestId};

use crate::config::ServerConfig;
use crate::protocol::ProtocolHandler;
use crate::types::{ServerError, ServerResult, SERVER_VERSION};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared server state passed to all handlers via axum State.
pub struct ServerState {
    pub handler: ProtocolHandler,
    pub max_body_bytes: usize,
}

/// HTTP binding for the dispatcher.
pub struct HttpTransport {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl HttpTransport {
    pub fn new(handler: ProtocolHandler, config: ServerConfig) -> Self {
        Self {
            state: Arc::new(ServerState {
                handler,
                max_body_bytes: config.max_body_bytes,
            }),
            config,
        }
    }

    /// Build the axum router without binding a socket.
    pub fn router(&self) -> Router {
        let router = Router::new()
            .route(&self.config.path, any(handle_rpc))
            .route("/health", get(handle_health))
            .with_state(self.state.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(middleware::from_fn(log_requests))
                    .layer(TimeoutLayer::new(self.config.request_timeout)),
            );

        if self.config.cors {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Run the HTTP server on the configured address until Ctrl+C.
    pub async fn run(&self) -> ServerResult<()> {
        let app = self.router();
        let addr = &self.config.addr;

        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!(
            "JSON-RPC server listening on http://{}{}",
            listener.local_addr()?,
            self.config.path
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

/// Logs `METHOD path -> status (elapsed)` for every request and tags the
/// response with a request id.
async fn log_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = uuid::Uuid::new_v4();

    let mut response = next.run(request).await;

    tracing::info!(
        %request_id,
        "{method} {path} -> {} ({}ms)",
        response.status().as_u16(),
        started.elapsed().as_millis()
    );

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Handle JSON-RPC payloads.
async fn handle_rpc(State(state): State<Arc<ServerState>>, method: Method, body: Body) -> Response {
    if method != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "POST")],
            "JSON-RPC endpoint only accepts POST requests",
        )
            .into_response();
    }

    let bytes = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to read request body: {e}");
            let reply = Reply::Rejected(rpc_dispatch::Response::error(
                RequestId::Null,
                ErrorObject::parse_error("failed to read request"),
            ));
            return render(StatusCode::BAD_REQUEST, &reply);
        }
    };

    let reply = state.handler.handle_payload(&bytes).await;
    let status = match reply {
        Reply::Rejected(_) => StatusCode::BAD_REQUEST,
        Reply::Single(_) | Reply::Batch(_) => StatusCode::OK,
        Reply::NoContent => StatusCode::NO_CONTENT,
    };
    render(status, &reply)
}

fn render(status: StatusCode, reply: &Reply) -> Response {
    match reply.to_json() {
        Ok(Some(json)) => (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        )
            .into_response(),
        Ok(None) => status.into_response(),
        Err(e) => {
            tracing::error!("Failed to write response: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<ServerState>>) -> AxumJson<serde_json::Value> {
    AxumJson(serde_json::json!({
        "status": "ok",
        "version": SERVER_VERSION,
        "methods": state.handler.dispatcher().registry().len(),
    }))
}
