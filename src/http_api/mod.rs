use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    Constraints, Diagnostic, SolverConfig, Timetable, TimetableRequest, TimetableResponse,
    evolve_options, generate_options, validate_timetable,
};

#[derive(Clone)]
pub struct AppState {
    config: Arc<RwLock<SolverConfig>>,
}

impl AppState {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    fn config(&self) -> SolverConfig {
        self.config.read().clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(value: tokio::task::JoinError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidatePayload {
    pub request: TimetableRequest,
    pub timetable: Timetable,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<String>,
    /// Problems found while reading the request or mapping the timetable onto it.
    pub diagnostics: Vec<Diagnostic>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/config", get(get_config).put(update_config))
        .route("/timetables/generate", post(generate))
        .route("/timetables/evolve", post(evolve))
        .route("/timetables/validate", post(validate))
        .fallback(not_found)
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, config: SolverConfig) -> std::io::Result<()> {
    let state = AppState::new(config);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "timetable HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {uri}"))
}

async fn get_config(State(state): State<AppState>) -> Json<SolverConfig> {
    Json(state.config())
}

async fn update_config(
    State(state): State<AppState>,
    Json(config): Json<SolverConfig>,
) -> Result<Json<SolverConfig>, ApiError> {
    config
        .validate()
        .map_err(|err| ApiError::invalid(err.to_string()))?;
    *state.config.write() = config.clone();
    Ok(Json(config))
}

async fn generate(
    State(state): State<AppState>,
    Json(request): Json<TimetableRequest>,
) -> Result<Json<TimetableResponse>, ApiError> {
    let config = state.config();
    let response =
        tokio::task::spawn_blocking(move || generate_options(&request, &config)).await?;
    Ok(Json(response))
}

async fn evolve(
    State(state): State<AppState>,
    Json(request): Json<TimetableRequest>,
) -> Result<Json<TimetableResponse>, ApiError> {
    let config = state.config();
    let response = tokio::task::spawn_blocking(move || evolve_options(&request, &config)).await?;
    if response.options.is_empty() {
        warn!("population search produced no options");
    }
    Ok(Json(response))
}

async fn validate(Json(payload): Json<ValidatePayload>) -> Json<ValidationReport> {
    let (constraints, mut diagnostics) = Constraints::from_request(&payload.request);
    let (grid, rejected) = payload.timetable.to_grid(&constraints);
    diagnostics.extend(rejected);
    let violations: Vec<String> = validate_timetable(&grid, &constraints)
        .iter()
        .map(ToString::to_string)
        .collect();
    Json(ValidationReport {
        valid: violations.is_empty(),
        violations,
        diagnostics,
    })
}
