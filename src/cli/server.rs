//! HTTP server mode: one GET route per list path

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::engine::{SyncEngine, SyncRequest};
use crate::error::{Error, ErrorKind, Result};
use crate::output::encode_json_array;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    engine: SyncEngine,
}

/// Query string of a list request
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    /// Legacy parameter; the list is taken from the path
    #[serde(default)]
    #[allow(dead_code)]
    list: Option<String>,
    /// Only items modified after this timestamp
    #[serde(default)]
    since: Option<String>,
    /// Dot-delimited field path copied into `_updated`
    #[serde(default)]
    since_path: Option<String>,
}

/// Error response body
#[derive(Debug, Serialize)]
struct ApiResponse {
    success: bool,
    error: String,
}

impl ApiResponse {
    fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

/// Build the router
pub fn router(engine: SyncEngine) -> Router {
    Router::new()
        .route("/*list_path", get(stream_list))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { engine })
}

/// Start the HTTP server
pub async fn serve(engine: SyncEngine, config: ServerConfig) -> Result<()> {
    let port = config.port;
    let app = router(engine);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Stream every item of the list at the request path
async fn stream_list(
    State(state): State<AppState>,
    Path(list_path): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let request = SyncRequest::new(list_path)
        .with_since(query.since)
        .with_since_path(query.since_path);
    let list = request.list.clone();

    match state.engine.start(request).await {
        Ok(entities) => {
            let body = encode_json_array(entities);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Body::from_stream(body),
            )
                .into_response()
        }
        Err(e) => {
            error!(list = %list, "List request failed: {e}");
            (status_for(&e), Json(ApiResponse::error(e.to_string()))).into_response()
        }
    }
}

/// Response status for an error raised before the body started
fn status_for(error: &Error) -> StatusCode {
    match (error, error.kind()) {
        (Error::Timeout { .. }, _) => StatusCode::GATEWAY_TIMEOUT,
        (_, ErrorKind::Configuration) => StatusCode::INTERNAL_SERVER_ERROR,
        (_, ErrorKind::Network | ErrorKind::Upstream) => StatusCode::BAD_GATEWAY,
        (_, ErrorKind::Internal) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
