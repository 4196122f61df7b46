pub mod artists;
pub mod pages;
pub mod shows;
pub mod venues;

use askama::Template;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::{Local, NaiveDateTime};

use fyyur_core::forms::FormData;

use crate::error::AppError;
use crate::flash::{self, Notice};
use crate::state::AppState;
use crate::templates::HomeTemplate;

/// Local wall-clock time used to split past from upcoming shows.
pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Renders a full page. Notices are shown in the page itself, so any pending
/// flash cookie is cleared.
pub(crate) fn render_page<T: Template>(status: StatusCode, template: T) -> Result<Response, AppError> {
    let html = template.render()?;
    Ok((status, [(SET_COOKIE, flash::clear_cookie())], Html(html)).into_response())
}

/// 303 redirect carrying `notices` to the next page.
pub(crate) fn redirect_with(location: &str, notices: &[Notice]) -> Response {
    (
        [(SET_COOKIE, flash::set_cookie(notices))],
        Redirect::to(location),
    )
        .into_response()
}

pub(crate) async fn home_page(
    state: &AppState,
    notices: Vec<Notice>,
    status: StatusCode,
) -> Result<Response, AppError> {
    let counts = state.storage.counts().await?;
    render_page(status, HomeTemplate { notices, counts })
}

/// Ids that are not positive integers never match a record.
pub(crate) fn parse_id(raw: &str, entity: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::NotFound(format!("{entity} {raw} not found")))
}

pub(crate) fn form_data(pairs: Vec<(String, String)>) -> FormData {
    pairs.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_rejects_non_positive_and_garbage() {
        assert_eq!(parse_id("12", "venue").unwrap(), 12);
        for raw in ["0", "-3", "abc", "1.5", ""] {
            let err = parse_id(raw, "venue").unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
        }
    }

    #[test]
    fn test_redirect_sets_flash_cookie() {
        let response = redirect_with("/venues/1", &[Notice::success("saved")]);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("fyyur_flash="));
        assert_eq!(response.headers()["location"], "/venues/1");
    }
}
