use crate::error::XrefError;
use crate::service::LookupService;
use crate::types::{BrakePadGroup, SearchResponse, WiperGroup};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use hyper::Server;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LookupService>,
}

/// Body of every lookup endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub part_number: String,
}

/// Lookup failure rendered as `{"error": "..."}`.
pub struct ApiError(XrefError);

impl From<XrefError> for ApiError {
    fn from(err: XrefError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = if self.0.is_client_error() {
            (StatusCode::BAD_REQUEST, self.0.to_string())
        } else {
            error!(error = %self.0, "Lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, XrefError::NoData.to_string())
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "parts_xref",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics_text() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::render(),
    )
}

/// A missing or unparseable body reads as an empty part number, which the
/// service rejects with the usual 400.
fn part_number(body: Result<Json<SearchRequest>, JsonRejection>) -> String {
    match body {
        Ok(Json(req)) => req.part_number,
        Err(rejection) => {
            debug!(%rejection, "Unreadable request body");
            SearchRequest::default().part_number
        }
    }
}

async fn search(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse<WiperGroup>>, ApiError> {
    Ok(Json(state.service.search(&part_number(body)).await?))
}

async fn search_prefix(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse<WiperGroup>>, ApiError> {
    Ok(Json(state.service.search_prefix(&part_number(body)).await?))
}

async fn search_brake_pads(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse<BrakePadGroup>>, ApiError> {
    Ok(Json(state.service.search_brake_pads(&part_number(body)).await?))
}

/// Create the HTTP router with all routes
pub fn create_server(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .route("/search", post(search))
        .route("/search-prefix", post(search_prefix))
        .route("/search-brake-pads", post(search_brake_pads))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    state: AppState,
    static_dir: impl AsRef<Path>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_server(state, static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server listening on {}", addr);
    println!("🚀 Parts lookup running on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
