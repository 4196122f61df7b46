use std::any::Any;

use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::server_error_page;
use crate::handlers::{artists, pages, shows, venues};
use crate::state::AppState;

pub fn app_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(pages::health))
        .route("/metrics", get(pages::metrics))
        // Venues
        .route("/venues", get(venues::venues))
        .route("/venues/search", post(venues::search_venues))
        .route(
            "/venues/create",
            get(venues::create_venue_form).post(venues::create_venue_submission),
        )
        .route(
            "/venues/:venue_id",
            get(venues::show_venue).delete(venues::delete_venue),
        )
        .route(
            "/venues/:venue_id/edit",
            get(venues::edit_venue).post(venues::edit_venue_submission),
        )
        .route("/venues/:venue_id/delete", post(venues::delete_venue_submission))
        // Artists
        .route("/artists", get(artists::artists))
        .route("/artists/search", post(artists::search_artists))
        .route(
            "/artists/create",
            get(artists::create_artist_form).post(artists::create_artist_submission),
        )
        .route("/artists/:artist_id", get(artists::show_artist))
        .route(
            "/artists/:artist_id/edit",
            get(artists::edit_artist).post(artists::edit_artist_submission),
        )
        // Shows
        .route("/shows", get(shows::shows))
        .route(
            "/shows/create",
            get(shows::create_show_form).post(shows::create_show_submission),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(pages::not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", detail);
    server_error_page(Vec::new())
}
