use askama::Template;
use chrono::NaiveDateTime;

use fyyur_core::{
    ArtistDetail, ArtistSummary, CatalogCounts, CityGroup, Page, SearchResults, ShowListing,
    VenueDetail,
};

use crate::flash::Notice;
use crate::models::{FormView, SelectOption};

/// Medium: `Sun 04, 01, 2035 8:00PM`. Full: `Sunday April, 1, 2035 at 8:00PM`.
pub fn format_datetime(value: &NaiveDateTime, format: &str) -> String {
    let pattern = match format {
        "full" => "%A %B, %-d, %Y at %-I:%M%p",
        _ => "%a %m, %d, %Y %-I:%M%p",
    };
    value.format(pattern).to_string()
}

mod filters {
    use chrono::NaiveDateTime;

    pub fn datetime(value: &NaiveDateTime, format: &str) -> ::askama::Result<String> {
        Ok(super::format_datetime(value, format))
    }
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub notices: Vec<Notice>,
    pub counts: CatalogCounts,
}

#[derive(Template)]
#[template(path = "pages/venues.html")]
pub struct VenuesTemplate {
    pub notices: Vec<Notice>,
    pub areas: Vec<CityGroup>,
}

#[derive(Template)]
#[template(path = "pages/search_venues.html")]
pub struct SearchVenuesTemplate {
    pub notices: Vec<Notice>,
    pub results: SearchResults,
    pub search_term: String,
}

#[derive(Template)]
#[template(path = "pages/show_venue.html")]
pub struct ShowVenueTemplate {
    pub notices: Vec<Notice>,
    pub detail: VenueDetail,
}

#[derive(Template)]
#[template(path = "forms/new_venue.html")]
pub struct NewVenueTemplate {
    pub notices: Vec<Notice>,
    pub form: FormView,
}

#[derive(Template)]
#[template(path = "forms/edit_venue.html")]
pub struct EditVenueTemplate {
    pub notices: Vec<Notice>,
    pub venue_id: i64,
    pub venue_name: String,
    pub form: FormView,
}

#[derive(Template)]
#[template(path = "pages/artists.html")]
pub struct ArtistsTemplate {
    pub notices: Vec<Notice>,
    pub artists: Vec<ArtistSummary>,
}

#[derive(Template)]
#[template(path = "pages/search_artists.html")]
pub struct SearchArtistsTemplate {
    pub notices: Vec<Notice>,
    pub results: SearchResults,
    pub search_term: String,
}

#[derive(Template)]
#[template(path = "pages/show_artist.html")]
pub struct ShowArtistTemplate {
    pub notices: Vec<Notice>,
    pub detail: ArtistDetail,
}

#[derive(Template)]
#[template(path = "forms/new_artist.html")]
pub struct NewArtistTemplate {
    pub notices: Vec<Notice>,
    pub form: FormView,
}

#[derive(Template)]
#[template(path = "forms/edit_artist.html")]
pub struct EditArtistTemplate {
    pub notices: Vec<Notice>,
    pub artist_id: i64,
    pub artist_name: String,
    pub form: FormView,
}

#[derive(Template)]
#[template(path = "pages/shows.html")]
pub struct ShowsTemplate {
    pub notices: Vec<Notice>,
    pub page: Page<ShowListing>,
}

#[derive(Template)]
#[template(path = "forms/new_show.html")]
pub struct NewShowTemplate {
    pub notices: Vec<Notice>,
    pub form: FormView,
    pub artists: Vec<SelectOption>,
    pub venues: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "errors/404.html")]
pub struct NotFoundTemplate {
    pub notices: Vec<Notice>,
}

#[derive(Template)]
#[template(path = "errors/500.html")]
pub struct ServerErrorTemplate {
    pub notices: Vec<Notice>,
    pub status: u16,
}
