use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Form;
use serde::Deserialize;
use tracing::{error, info, warn};

use fyyur_core::forms::{FormData, ShowForm, ValidationError};
use fyyur_core::StorageError;

use super::{form_data, home_page, render_page};
use crate::error::AppError;
use crate::flash::{Flash, Notice};
use crate::metrics::{self, RejectReason};
use crate::models::FormView;
use crate::state::AppState;
use crate::templates::{NewShowTemplate, ShowsTemplate};

const ENTITY: &str = "show";

#[derive(Debug, Deserialize)]
pub struct ShowsQuery {
    pub page: Option<String>,
}

pub async fn shows(
    State(state): State<AppState>,
    flash: Flash,
    Query(query): Query<ShowsQuery>,
) -> Result<Response, AppError> {
    let page = query
        .page
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .unwrap_or(1);
    let page = state
        .storage
        .list_shows(page, state.config.shows_per_page)
        .await?;
    render_page(
        StatusCode::OK,
        ShowsTemplate {
            notices: flash.into_notices(),
            page,
        },
    )
}

async fn new_show_page(
    state: &AppState,
    status: StatusCode,
    notices: Vec<Notice>,
    form: FormView,
) -> Result<Response, AppError> {
    let artists = state.storage.artist_choices().await?;
    let venues = state.storage.venue_choices().await?;
    render_page(
        status,
        NewShowTemplate {
            notices,
            artists: form.choice_options("artist_id", &artists),
            venues: form.choice_options("venue_id", &venues),
            form,
        },
    )
}

pub async fn create_show_form(
    State(state): State<AppState>,
    flash: Flash,
) -> Result<Response, AppError> {
    new_show_page(&state, StatusCode::OK, flash.into_notices(), FormView::blank()).await
}

async fn reject(
    state: &AppState,
    flash: Flash,
    data: FormData,
    errors: ValidationError,
) -> Result<Response, AppError> {
    warn!("Rejected show submission: {}", errors);
    metrics::record_rejected(ENTITY, RejectReason::Validation);
    let notices = flash.with(Notice::error(
        "Show could not be listed. Please correct the highlighted fields.",
    ));
    new_show_page(
        state,
        StatusCode::BAD_REQUEST,
        notices,
        FormView::with_errors(data, errors),
    )
    .await
}

pub async fn create_show_submission(
    State(state): State<AppState>,
    flash: Flash,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let data = form_data(pairs);
    let form = match ShowForm::from_form(&data) {
        Ok(form) => form,
        Err(errors) => return reject(&state, flash, data, errors).await,
    };

    match state.storage.create_show(form).await {
        Ok(show) => {
            metrics::record_created(ENTITY);
            info!(
                "Listed show {} (artist {} at venue {})",
                show.id, show.artist_id, show.venue_id
            );
            let notice = Notice::success("Show was successfully listed!");
            home_page(&state, flash.with(notice), StatusCode::OK).await
        }
        Err(StorageError::Validation(errors)) => reject(&state, flash, data, errors).await,
        Err(e) => {
            error!("Failed to create show: {}", e);
            metrics::record_rejected(ENTITY, RejectReason::Persistence);
            let notice = Notice::error("An error occurred. Show could not be listed.");
            home_page(&state, flash.with(notice), StatusCode::INTERNAL_SERVER_ERROR).await
        }
    }
}
