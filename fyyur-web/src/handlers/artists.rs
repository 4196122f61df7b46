use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Form;
use tracing::{error, info, warn};

use fyyur_core::forms::{ArtistForm, FormData};
use fyyur_core::StorageError;

use super::{form_data, home_page, now, parse_id, redirect_with, render_page};
use crate::error::AppError;
use crate::flash::{Flash, Notice};
use crate::metrics::{self, RejectReason};
use crate::models::FormView;
use crate::state::AppState;
use crate::templates::{
    ArtistsTemplate, EditArtistTemplate, NewArtistTemplate, SearchArtistsTemplate,
    ShowArtistTemplate,
};

const ENTITY: &str = "artist";

pub async fn artists(State(state): State<AppState>, flash: Flash) -> Result<Response, AppError> {
    let artists = state.storage.list_artists(now()).await?;
    render_page(
        StatusCode::OK,
        ArtistsTemplate {
            notices: flash.into_notices(),
            artists,
        },
    )
}

pub async fn search_artists(
    State(state): State<AppState>,
    flash: Flash,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let data = form_data(pairs);
    let search_term = data.value("search_term").trim().to_string();
    let results = state.storage.search_artists(&search_term, now()).await?;
    metrics::record_search(ENTITY);
    info!("Artist search '{}' matched {} artist(s)", search_term, results.count);

    render_page(
        StatusCode::OK,
        SearchArtistsTemplate {
            notices: flash.into_notices(),
            results,
            search_term,
        },
    )
}

pub async fn show_artist(
    State(state): State<AppState>,
    flash: Flash,
    Path(artist_id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&artist_id, ENTITY)?;
    let detail = state.storage.artist_detail(id, now()).await?;
    render_page(
        StatusCode::OK,
        ShowArtistTemplate {
            notices: flash.into_notices(),
            detail,
        },
    )
}

pub async fn create_artist_form(flash: Flash) -> Result<Response, AppError> {
    render_page(
        StatusCode::OK,
        NewArtistTemplate {
            notices: flash.into_notices(),
            form: FormView::blank(),
        },
    )
}

pub async fn create_artist_submission(
    State(state): State<AppState>,
    flash: Flash,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let data = form_data(pairs);
    let form = match ArtistForm::from_form(&data) {
        Ok(form) => form,
        Err(errors) => {
            warn!("Rejected artist submission: {}", errors);
            metrics::record_rejected(ENTITY, RejectReason::Validation);
            return render_page(
                StatusCode::BAD_REQUEST,
                NewArtistTemplate {
                    notices: flash.with(Notice::error(
                        "Artist could not be listed. Please correct the highlighted fields.",
                    )),
                    form: FormView::with_errors(data, errors),
                },
            );
        }
    };

    let name = form.name.clone();
    match state.storage.create_artist(form).await {
        Ok(artist) => {
            metrics::record_created(ENTITY);
            let notice = Notice::success(format!("Artist {} was successfully listed!", artist.name));
            home_page(&state, flash.with(notice), StatusCode::OK).await
        }
        Err(e) => {
            error!("Failed to create artist '{}': {}", name, e);
            metrics::record_rejected(ENTITY, RejectReason::Persistence);
            let notice = Notice::error(format!(
                "An error occurred. Artist {} could not be listed.",
                name
            ));
            home_page(&state, flash.with(notice), StatusCode::INTERNAL_SERVER_ERROR).await
        }
    }
}

pub async fn edit_artist(
    State(state): State<AppState>,
    flash: Flash,
    Path(artist_id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&artist_id, ENTITY)?;
    let artist = state.storage.get_artist(id).await?;
    render_page(
        StatusCode::OK,
        EditArtistTemplate {
            notices: flash.into_notices(),
            artist_id: artist.id,
            form: FormView::filled(FormData::from(&artist)),
            artist_name: artist.name,
        },
    )
}

pub async fn edit_artist_submission(
    State(state): State<AppState>,
    flash: Flash,
    Path(artist_id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let id = parse_id(&artist_id, ENTITY)?;
    let current = state.storage.get_artist(id).await?;

    let data = form_data(pairs);
    let form = match ArtistForm::from_form(&data) {
        Ok(form) => form,
        Err(errors) => {
            warn!("Rejected edit of artist {}: {}", id, errors);
            metrics::record_rejected(ENTITY, RejectReason::Validation);
            return render_page(
                StatusCode::BAD_REQUEST,
                EditArtistTemplate {
                    notices: flash.with(Notice::error(format!(
                        "Artist {} was not updated. Please correct the highlighted fields.",
                        current.name
                    ))),
                    artist_id: id,
                    artist_name: current.name,
                    form: FormView::with_errors(data, errors),
                },
            );
        }
    };

    let location = format!("/artists/{id}");
    match state.storage.update_artist(id, form).await {
        Ok(artist) => {
            metrics::record_updated(ENTITY);
            let notice = Notice::success(format!("Artist {} was successfully updated!", artist.name));
            Ok(redirect_with(&location, &flash.with(notice)))
        }
        Err(e @ StorageError::NotFound { .. }) => Err(e.into()),
        Err(e) => {
            error!("Failed to update artist {}: {}", id, e);
            metrics::record_rejected(ENTITY, RejectReason::Persistence);
            let notice = Notice::error(format!(
                "An error occurred. Artist {} could not be updated.",
                current.name
            ));
            Ok(redirect_with(&location, &flash.with(notice)))
        }
    }
}
