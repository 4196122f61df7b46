use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use fyyur_core::seed::seed_demo_catalog;
use fyyur_core::{Genre, SqliteStorage, Storage};
use fyyur_web::{app_router, AppState, Config};

struct TestApp {
    router: Router,
    storage: Arc<SqliteStorage>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(Config::default())
    }

    fn with_config(config: Config) -> Self {
        let storage = Arc::new(SqliteStorage::in_memory().unwrap());
        let config = Config {
            static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
            ..config
        };
        let state = AppState::new(storage.clone(), config, None);
        Self {
            router: app_router(state),
            storage,
        }
    }

    async fn seeded() -> Self {
        let app = Self::new();
        assert!(seed_demo_catalog(app.storage.as_ref()).await.unwrap());
        app
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, String) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, body: &str) -> (StatusCode, HeaderMap, String) {
        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

const NEW_VENUE: &str = "name=The+Musical+Hop&city=San+Francisco&state=CA\
    &address=1015+Folsom+Street&phone=123-123-1234&genres=Jazz&genres=Reggae\
    &website=https%3A%2F%2Fwww.themusicalhop.com&seeking_talent=y\
    &seeking_description=Local+artists+wanted";

fn flash_cookie(headers: &HeaderMap) -> String {
    let set_cookie = headers[SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_home_page_shows_counts() {
    let app = TestApp::seeded().await;
    let (status, _, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Fyyur"));
    assert!(body.contains("<strong>3</strong> venues"));
    assert!(body.contains("<strong>5</strong> shows"));
}

#[tokio::test]
async fn test_create_venue_persists_and_flashes() {
    let app = TestApp::new();
    let (status, _, body) = app.post_form("/venues/create", NEW_VENUE).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Venue The Musical Hop was successfully listed!"));

    let counts = app.storage.counts().await.unwrap();
    assert_eq!(counts.venues, 1);
    let venue = app.storage.get_venue(1).await.unwrap();
    assert_eq!(venue.name, "The Musical Hop");
    assert_eq!(venue.state, "CA");
    assert_eq!(venue.genres, vec![Genre::Jazz, Genre::Reggae]);
    assert!(venue.seeking_talent);
    assert_eq!(venue.facebook_link, None);

    let (status, _, body) = app.get("/venues").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("San Francisco, CA"));
    assert!(body.contains("The Musical Hop"));
}

#[tokio::test]
async fn test_invalid_venue_is_rejected_and_refilled() {
    let app = TestApp::new();
    let body = "name=&city=San+Francisco&state=ZZ&address=1+Main&phone=123-123-1234";
    let (status, _, page) = app.post_form("/venues/create", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(page.contains("is required"));
    assert!(page.contains("is not a US state code"));
    assert!(page.contains(r#"value="San Francisco""#));
    assert_eq!(app.storage.counts().await.unwrap().venues, 0);
}

#[tokio::test]
async fn test_search_is_case_insensitive_partial_match() {
    let app = TestApp::seeded().await;

    let (status, _, body) = app.post_form("/venues/search", "search_term=hop").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("The Musical Hop"));
    assert!(body.contains(": 1</h3>"));

    let (_, _, body) = app.post_form("/venues/search", "search_term=Music").await;
    assert!(body.contains(": 2</h3>"));

    let (_, _, body) = app.post_form("/artists/search", "search_term=A").await;
    assert!(body.contains(": 3</h3>"));
    assert!(body.contains("Guns N Petals"));

    let (_, _, body) = app.post_form("/artists/search", "search_term=zzz").await;
    assert!(body.contains(": 0</h3>"));
}

#[tokio::test]
async fn test_unknown_records_and_paths_are_not_found() {
    let app = TestApp::seeded().await;
    for uri in ["/venues/999", "/venues/abc", "/artists/0", "/artists/999/edit", "/nowhere"] {
        let (status, _, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body.contains("404"), "{uri}");
    }
}

#[tokio::test]
async fn test_venue_detail_splits_past_and_upcoming() {
    let app = TestApp::seeded().await;
    let (status, _, body) = app.get("/venues/3").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Park Square Live Music &amp; Coffee"));
    assert!(body.contains("Upcoming Shows: 3"));
    assert!(body.contains("Past Shows: 1"));
    assert!(body.contains("Sunday April, 1, 2035 at 8:00PM"));

    let (_, _, body) = app.get("/artists/3").await;
    assert!(body.contains("Upcoming Shows: 3"));
    assert!(body.contains("Past Shows: 0"));
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let app = TestApp::seeded().await;
    let (status, _, body) = app.get("/artists/1/edit").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"value="Guns N Petals""#));
    assert!(body.contains(r#"name="seeking_venue" value="y" checked"#));
    assert!(body.contains(r#"<option value="CA" selected>"#));
}

#[tokio::test]
async fn test_invalid_edit_leaves_record_unchanged() {
    let app = TestApp::seeded().await;
    let before = app.storage.get_venue(1).await.unwrap();

    let body = "name=&city=Oakland&state=CA&address=1+Main&phone=123-123-1234";
    let (status, _, page) = app.post_form("/venues/1/edit", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(page.contains("is required"));

    assert_eq!(app.storage.get_venue(1).await.unwrap(), before);
}

#[tokio::test]
async fn test_edit_redirects_and_flash_shows_once() {
    let app = TestApp::seeded().await;
    let body = "name=The+Musical+Hop+Annex&city=San+Francisco&state=CA\
        &address=1015+Folsom+Street&phone=123-123-1234&genres=Jazz";
    let (status, headers, _) = app.post_form("/venues/1/edit", body).await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[LOCATION], "/venues/1");
    let venue = app.storage.get_venue(1).await.unwrap();
    assert_eq!(venue.name, "The Musical Hop Annex");
    assert!(!venue.seeking_talent);

    let request = Request::get("/venues/1")
        .header(COOKIE, flash_cookie(&headers))
        .body(Body::empty())
        .unwrap();
    let (status, headers, page) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Venue The Musical Hop Annex was successfully updated!"));
    assert!(headers[SET_COOKIE].to_str().unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_artist_edit_clears_seeking_flag() {
    let app = TestApp::seeded().await;
    assert!(app.storage.get_artist(1).await.unwrap().seeking_venue);

    let body = "name=Guns+N+Petals&city=San+Francisco&state=CA&phone=326-123-5000\
        &genres=Rock+n+Roll&seeking_description=";
    let (status, headers, _) = app.post_form("/artists/1/edit", body).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[LOCATION], "/artists/1");

    let artist = app.storage.get_artist(1).await.unwrap();
    assert!(!artist.seeking_venue);
    assert_eq!(artist.seeking_description, None);
}

#[tokio::test]
async fn test_delete_venue_with_shows_is_refused() {
    let app = TestApp::seeded().await;
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/venues/1")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::CONFLICT);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], false);
    assert!(app.storage.get_venue(1).await.is_ok());
}

#[tokio::test]
async fn test_delete_venue_without_shows() {
    let app = TestApp::seeded().await;
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/venues/2")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["name"], "The Dueling Pianos Bar");
    assert!(headers[SET_COOKIE].to_str().unwrap().starts_with("fyyur_flash="));

    let (status, _, _) = app.get("/venues/2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/venues/2")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_form_fallback_redirects_home() {
    let app = TestApp::seeded().await;
    let (status, headers, _) = app.post_form("/venues/2/delete", "").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[LOCATION], "/");

    let (status, headers, _) = app.post_form("/venues/1/delete", "").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[LOCATION], "/venues/1");
    assert_eq!(app.storage.counts().await.unwrap().venues, 2);
}

#[tokio::test]
async fn test_show_with_unknown_artist_is_rejected() {
    let app = TestApp::seeded().await;
    let (status, _, page) = app
        .post_form(
            "/shows/create",
            "artist_id=99&venue_id=1&start_time=2035-05-01T20%3A00",
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(page.contains("no artist with id 99"));
    assert_eq!(app.storage.counts().await.unwrap().shows, 5);
}

#[tokio::test]
async fn test_create_show() {
    let app = TestApp::seeded().await;
    let (status, _, page) = app
        .post_form(
            "/shows/create",
            "artist_id=2&venue_id=1&start_time=2035-05-01+20%3A00%3A00",
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Show was successfully listed!"));
    assert_eq!(app.storage.counts().await.unwrap().shows, 6);

    let (_, _, body) = app.get("/venues/1").await;
    assert!(body.contains("Upcoming Shows: 1"));
    assert!(body.contains("Matt Quevedo"));
}

#[tokio::test]
async fn test_show_form_lists_choices() {
    let app = TestApp::seeded().await;
    let (status, _, body) = app.get("/shows/create").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Guns N Petals (#1)"));
    assert!(body.contains("The Dueling Pianos Bar (#2)"));
}

#[tokio::test]
async fn test_show_listing_is_paginated() {
    let app = TestApp::with_config(Config {
        shows_per_page: 2,
        ..Config::default()
    });
    seed_demo_catalog(app.storage.as_ref()).await.unwrap();

    let (status, _, body) = app.get("/shows").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Page 1 of 3 (5 shows)"));
    assert!(body.contains("/shows?page=2"));

    let (_, _, body) = app.get("/shows?page=3").await;
    assert!(body.contains("Page 3 of 3"));
    assert!(body.contains("The Wild Sax Band"));

    let (status, _, body) = app.get("/shows?page=junk").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Page 1 of 3"));
    let (status, _, body) = app.get("/shows?page=99").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Page 3 of 3 (5 shows)"));
    assert!(!body.contains("No shows listed yet"));
}

#[tokio::test]
async fn test_blank_forms_render() {
    let app = TestApp::new();
    for uri in ["/venues/create", "/artists/create", "/shows/create"] {
        let (status, _, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body.contains("<form"), "{uri}");
    }
}

#[tokio::test]
async fn test_health_static_and_metrics() {
    let app = TestApp::new();

    let (status, _, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "fyyur");

    let (status, _, body) = app.get("/static/css/main.css").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(".navbar"));

    let (status, _, _) = app.get("/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
