use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::error::RecordError;
use crate::models::{Entity, Patient, Student};
use crate::services::records;
use crate::store::{JsonFileGateway, Repository, SortError};

/// Failure of a request, mapped onto a status code and a JSON body.
#[derive(Debug)]
pub enum ServerError {
    Record(RecordError),
    Query(SortError),
    /// Axum could not decode the request body
    Body(JsonRejection),
    /// The body decoded as JSON but not as the expected payload
    Payload(String),
}

impl From<RecordError> for ServerError {
    fn from(err: RecordError) -> Self {
        Self::Record(err)
    }
}

impl From<SortError> for ServerError {
    fn from(err: SortError) -> Self {
        Self::Query(err)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(err: JsonRejection) -> Self {
        Self::Body(err)
    }
}

impl From<crate::error::ValidationError> for ServerError {
    fn from(err: crate::error::ValidationError) -> Self {
        Self::Record(err.into())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ServerError::Record(ref e @ RecordError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, error_body("not_found", e.to_string()))
            }
            ServerError::Record(ref e @ RecordError::Duplicate { .. }) => {
                (StatusCode::CONFLICT, error_body("duplicate", e.to_string()))
            }
            ServerError::Record(RecordError::Validation(ref v)) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": "validation",
                    "message": v.to_string(),
                    "field": v.field,
                    "rule": v.rule,
                }),
            ),
            ServerError::Record(ref e @ (RecordError::Io { .. } | RecordError::Parse { .. })) => {
                error!("Store failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, error_body("storage", e.to_string()))
            }
            ServerError::Query(ref e) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": "invalid_query",
                    "message": e.to_string(),
                    "allowed": e.allowed(),
                }),
            ),
            ServerError::Body(ref rejection) => (
                rejection.status(),
                error_body("invalid_body", rejection.body_text()),
            ),
            ServerError::Payload(ref message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                error_body("invalid_body", message.clone()),
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn error_body(kind: &str, message: String) -> serde_json::Value {
    serde_json::json!({ "error": kind, "message": message })
}

#[derive(Clone)]
pub struct AppState {
    pub patients: Arc<Repository<Patient>>,
    pub students: Arc<Repository<Student>>,
    pub since: String,
}

impl AppState {
    pub fn new(patients: Arc<Repository<Patient>>, students: Arc<Repository<Student>>) -> Self {
        Self {
            patients,
            students,
            since: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Full HTTP surface: informational routes plus one nested router per record kind.
pub fn app(state: AppState) -> Router {
    let informational = Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/health", get(health))
        .with_state(state.clone());

    informational
        .nest("/patients", records::router(state.patients))
        .nest("/students", records::router(state.students))
        .layer(TraceLayer::new_for_http())
}

async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the record keeper. Browse /patients or /students."
    }))
}

async fn about() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Validated record management for patients and students",
        "kinds": [Patient::KIND, Student::KIND],
    }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    since: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", since: state.since.clone() })
}

async fn open_repository<E: Entity>(
    path: &std::path::Path,
    init: bool,
) -> Result<Arc<Repository<E>>> {
    let gateway = JsonFileGateway::new(path);
    if init {
        gateway
            .init::<E>()
            .await
            .with_context(|| format!("Failed to initialise {} store at {:?}", E::KIND, path))?;
    }
    Ok(Arc::new(Repository::new(Arc::new(gateway))))
}

pub async fn run_server(config: ServiceConfig) -> Result<()> {
    info!("Initializing record keeper with {:?}", config);

    let patients = open_repository::<Patient>(&config.patients_path, config.init_stores).await?;
    let students = open_repository::<Student>(&config.students_path, config.init_stores).await?;
    let router = app(AppState::new(patients, students));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Record keeper listening at http://{}", config.bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Record keeper stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
