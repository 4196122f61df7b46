use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Serialize;
use tracing::{error, info, warn};

use fyyur_core::forms::{FormData, VenueForm};
use fyyur_core::{StorageError, Venue};

use super::{form_data, home_page, now, parse_id, redirect_with, render_page};
use crate::error::AppError;
use crate::flash::{self, Flash, Notice};
use crate::metrics::{self, RejectReason};
use crate::models::FormView;
use crate::state::AppState;
use crate::templates::{
    EditVenueTemplate, NewVenueTemplate, SearchVenuesTemplate, ShowVenueTemplate, VenuesTemplate,
};

const ENTITY: &str = "venue";

pub async fn venues(State(state): State<AppState>, flash: Flash) -> Result<Response, AppError> {
    let areas = state.storage.venues_by_area(now()).await?;
    render_page(
        StatusCode::OK,
        VenuesTemplate {
            notices: flash.into_notices(),
            areas,
        },
    )
}

pub async fn search_venues(
    State(state): State<AppState>,
    flash: Flash,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let data = form_data(pairs);
    let search_term = data.value("search_term").trim().to_string();
    let results = state.storage.search_venues(&search_term, now()).await?;
    metrics::record_search(ENTITY);
    info!("Venue search '{}' matched {} venue(s)", search_term, results.count);

    render_page(
        StatusCode::OK,
        SearchVenuesTemplate {
            notices: flash.into_notices(),
            results,
            search_term,
        },
    )
}

pub async fn show_venue(
    State(state): State<AppState>,
    flash: Flash,
    Path(venue_id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&venue_id, ENTITY)?;
    let detail = state.storage.venue_detail(id, now()).await?;
    render_page(
        StatusCode::OK,
        ShowVenueTemplate {
            notices: flash.into_notices(),
            detail,
        },
    )
}

pub async fn create_venue_form(flash: Flash) -> Result<Response, AppError> {
    render_page(
        StatusCode::OK,
        NewVenueTemplate {
            notices: flash.into_notices(),
            form: FormView::blank(),
        },
    )
}

pub async fn create_venue_submission(
    State(state): State<AppState>,
    flash: Flash,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let data = form_data(pairs);
    let form = match VenueForm::from_form(&data) {
        Ok(form) => form,
        Err(errors) => {
            warn!("Rejected venue submission: {}", errors);
            metrics::record_rejected(ENTITY, RejectReason::Validation);
            return render_page(
                StatusCode::BAD_REQUEST,
                NewVenueTemplate {
                    notices: flash.with(Notice::error(
                        "Venue could not be listed. Please correct the highlighted fields.",
                    )),
                    form: FormView::with_errors(data, errors),
                },
            );
        }
    };

    let name = form.name.clone();
    match state.storage.create_venue(form).await {
        Ok(venue) => {
            metrics::record_created(ENTITY);
            let notice = Notice::success(format!("Venue {} was successfully listed!", venue.name));
            home_page(&state, flash.with(notice), StatusCode::OK).await
        }
        Err(e) => {
            error!("Failed to create venue '{}': {}", name, e);
            metrics::record_rejected(ENTITY, RejectReason::Persistence);
            let notice = Notice::error(format!(
                "An error occurred. Venue {} could not be listed.",
                name
            ));
            home_page(&state, flash.with(notice), StatusCode::INTERNAL_SERVER_ERROR).await
        }
    }
}

pub async fn edit_venue(
    State(state): State<AppState>,
    flash: Flash,
    Path(venue_id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&venue_id, ENTITY)?;
    let venue = state.storage.get_venue(id).await?;
    render_page(
        StatusCode::OK,
        EditVenueTemplate {
            notices: flash.into_notices(),
            venue_id: venue.id,
            form: FormView::filled(FormData::from(&venue)),
            venue_name: venue.name,
        },
    )
}

pub async fn edit_venue_submission(
    State(state): State<AppState>,
    flash: Flash,
    Path(venue_id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let id = parse_id(&venue_id, ENTITY)?;
    let current = state.storage.get_venue(id).await?;

    let data = form_data(pairs);
    let form = match VenueForm::from_form(&data) {
        Ok(form) => form,
        Err(errors) => {
            warn!("Rejected edit of venue {}: {}", id, errors);
            metrics::record_rejected(ENTITY, RejectReason::Validation);
            return render_page(
                StatusCode::BAD_REQUEST,
                EditVenueTemplate {
                    notices: flash.with(Notice::error(format!(
                        "Venue {} was not updated. Please correct the highlighted fields.",
                        current.name
                    ))),
                    venue_id: id,
                    venue_name: current.name,
                    form: FormView::with_errors(data, errors),
                },
            );
        }
    };

    let location = format!("/venues/{id}");
    match state.storage.update_venue(id, form).await {
        Ok(venue) => {
            metrics::record_updated(ENTITY);
            let notice = Notice::success(format!("Venue {} was successfully updated!", venue.name));
            Ok(redirect_with(&location, &flash.with(notice)))
        }
        Err(e @ StorageError::NotFound { .. }) => Err(e.into()),
        Err(e) => {
            error!("Failed to update venue {}: {}", id, e);
            metrics::record_rejected(ENTITY, RejectReason::Persistence);
            let notice = Notice::error(format!(
                "An error occurred. Venue {} could not be updated.",
                current.name
            ));
            Ok(redirect_with(&location, &flash.with(notice)))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn remove_venue(state: &AppState, venue_id: &str) -> Result<Venue, AppError> {
    let id = parse_id(venue_id, ENTITY)?;
    match state.storage.delete_venue(id).await {
        Ok(venue) => {
            metrics::record_deleted(ENTITY);
            Ok(venue)
        }
        Err(e) => {
            let err = AppError::from(e);
            if err.status() == StatusCode::INTERNAL_SERVER_ERROR {
                error!("Failed to delete venue {}: {}", id, err);
            } else {
                warn!("Refused to delete venue {}: {}", id, err);
            }
            Err(err)
        }
    }
}

fn deleted_notice(venue: &Venue) -> Notice {
    Notice::success(format!("{} Venue was deleted", venue.name))
}

/// `DELETE /venues/{id}`, called from the detail page's script.
pub async fn delete_venue(State(state): State<AppState>, Path(venue_id): Path<String>) -> Response {
    match remove_venue(&state, &venue_id).await {
        Ok(venue) => {
            let cookie = flash::set_cookie(&[deleted_notice(&venue)]);
            let outcome = DeleteOutcome {
                success: true,
                name: Some(venue.name),
                error: None,
            };
            ([(SET_COOKIE, cookie)], Json(outcome)).into_response()
        }
        Err(err) => {
            let outcome = DeleteOutcome {
                success: false,
                name: None,
                error: Some(err.to_string()),
            };
            (err.status(), Json(outcome)).into_response()
        }
    }
}

/// `POST /venues/{id}/delete`, the form fallback: back home on success,
/// back to the venue on a refusal.
pub async fn delete_venue_submission(
    State(state): State<AppState>,
    flash: Flash,
    Path(venue_id): Path<String>,
) -> Result<Response, AppError> {
    match remove_venue(&state, &venue_id).await {
        Ok(venue) => Ok(redirect_with("/", &flash.with(deleted_notice(&venue)))),
        Err(AppError::Conflict(reason)) => {
            let notice = Notice::error(format!("Venue could not be deleted: {reason}"));
            Ok(redirect_with(&format!("/venues/{venue_id}"), &flash.with(notice)))
        }
        Err(err) => Err(err),
    }
}
