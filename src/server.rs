//! HTTP API server.
//!
//! Exposes the question-answering pipeline as a small JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/ask` | Answer `{"question": "..."}` from the dataset |
//! | `GET`  | `/api/insights` | Run the built-in dataset insights request |
//! | `GET`  | `/health` | Health check with indexing status |
//!
//! Successful answers have the shape:
//!
//! ```json
//! { "answer": "...", "sources": ["UMKM Dataset (Document 3)"] }
//! ```
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "question must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_initialized` (503), `internal` (500).
//!
//! # Startup
//!
//! [`run_server`] binds the listener first and builds the vector store in a
//! background task. Until indexing finishes, `/api/*` answers 503 and
//! `/health` reports `"initialized": false`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::error::RagError;
use crate::models::AskResponse;
use crate::rag::RagService;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    service: Arc<RagService>,
}

/// Starts the server from configuration.
///
/// Providers are constructed before binding, so a missing API key stops
/// startup with an error. Dataset indexing runs in the background after
/// the listener is up; an indexing failure is logged and leaves the
/// service answering 503.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let service = Arc::new(RagService::from_config(config)?);

    let indexer = service.clone();
    let dataset_path = config.dataset.path.clone();
    let source_label = config.dataset.source_label.clone();
    tokio::spawn(async move {
        if let Err(e) = indexer
            .initialize_from_dataset(&dataset_path, &source_label)
            .await
        {
            error!(
                error = %format!("{:#}", e),
                path = %dataset_path.display(),
                "dataset indexing failed; queries will return 503"
            );
        }
    });

    run_server_with_service(&config.server.bind, service).await
}

/// Serve an already constructed [`RagService`].
///
/// The service may or may not be initialized yet; handlers check on every
/// request. Useful for tests and custom binaries with their own providers.
pub async fn run_server_with_service(bind: &str, service: Arc<RagService>) -> anyhow::Result<()> {
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router.
pub fn router(service: Arc<RagService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/ask", post(handle_ask))
        .route("/api/insights", get(handle_insights))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { service })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<RagError>() {
            Some(RagError::NotInitialized) => AppError {
                status: StatusCode::SERVICE_UNAVAILABLE,
                code: "not_initialized",
                message: err.to_string(),
            },
            Some(RagError::EmptyQuestion) => bad_request(err.to_string()),
            _ => AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "internal",
                message: format!("{:#}", err),
            },
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    initialized: bool,
    documents: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        initialized: state.service.is_initialized(),
        documents: state.service.document_count(),
    })
}

// ============ POST /api/ask ============

/// Accepts `{"question": "..."}`.
///
/// The body is taken as raw JSON so that malformed bodies and missing or
/// non-string questions get the same 400 error shape as empty ones.
async fn handle_ask(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(body) = body.map_err(|e| bad_request(e.body_text()))?;

    let question = body
        .get("question")
        .and_then(Value::as_str)
        .ok_or_else(|| bad_request("question is required and must be a string"))?;

    let response = state.service.ask_question(question).await?;
    Ok(Json(response))
}

// ============ GET /api/insights ============

async fn handle_insights(State(state): State<AppState>) -> Result<Json<AskResponse>, AppError> {
    let response = state.service.generate_insights().await?;
    Ok(Json(response))
}
