use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use fyyur_core::forms::ValidationError;
use fyyur_core::StorageError;

use crate::flash::Notice;
use crate::templates::{NotFoundTemplate, ServerErrorTemplate};

/// Failures that escape a handler. Form validation is normally handled in the
/// handler by re-rendering the form; anything reaching here becomes a page.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(StorageError),

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        match err {
            StorageError::NotFound { .. } => AppError::NotFound(message),
            StorageError::Validation(errors) => AppError::Validation(errors),
            StorageError::HasDependents { .. } => AppError::Conflict(message),
            other => AppError::Storage(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Storage(_) | AppError::Template(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match status {
            StatusCode::NOT_FOUND => not_found_page(),
            StatusCode::INTERNAL_SERVER_ERROR => {
                error!("Request failed: {}", self);
                server_error_page(Vec::new())
            }
            _ => error_page(status, vec![Notice::error(self.to_string())]),
        }
    }
}

pub fn not_found_page() -> Response {
    match (NotFoundTemplate { notices: Vec::new() }).render() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            error!("Failed to render 404 page: {}", e);
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

pub fn server_error_page(notices: Vec<Notice>) -> Response {
    error_page(StatusCode::INTERNAL_SERVER_ERROR, notices)
}

/// Generic error page with `status` and the given notices.
fn error_page(status: StatusCode, notices: Vec<Notice>) -> Response {
    let template = ServerErrorTemplate {
        notices,
        status: status.as_u16(),
    };
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Failed to render error page: {}", e);
            (status, "Internal Server Error").into_response()
        }
    }
}
