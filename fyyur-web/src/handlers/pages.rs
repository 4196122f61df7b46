use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use super::home_page;
use crate::error::{not_found_page, AppError};
use crate::flash::Flash;
use crate::state::AppState;

pub async fn index(State(state): State<AppState>, flash: Flash) -> Result<Response, AppError> {
    home_page(&state, flash.into_notices(), StatusCode::OK).await
}

/// Reports `degraded` with 503 when the store cannot be queried.
pub async fn health(State(state): State<AppState>) -> Response {
    let (status, health) = match state.storage.counts().await {
        Ok(_) => (StatusCode::OK, "healthy"),
        Err(e) => {
            warn!("Health check could not reach storage: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };
    (
        status,
        Json(serde_json::json!({
            "status": health,
            "service": "fyyur",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
        .into_response()
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => not_found_page(),
    }
}

pub async fn not_found() -> Response {
    not_found_page()
}
