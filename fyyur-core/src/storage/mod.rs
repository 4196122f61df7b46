mod serialization;
mod session;
mod sqlite;

pub use session::Session;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::domain::*;
use crate::error::Result;
use crate::forms::{ArtistForm, ShowForm, VenueForm};

/// Largest page the show listing will ever return.
pub const MAX_PER_PAGE: u32 = 200;

/// Storage seam handed to every request handler.
///
/// Each method is one unit of work: it runs inside its own transaction, which
/// is committed when the method returns `Ok` and rolled back otherwise.
#[async_trait]
pub trait Storage: Send + Sync {
    // Venue operations
    async fn venues_by_area(&self, now: NaiveDateTime) -> Result<Vec<CityGroup>>;
    async fn search_venues(&self, term: &str, now: NaiveDateTime) -> Result<SearchResults>;
    async fn venue_detail(&self, id: i64, now: NaiveDateTime) -> Result<VenueDetail>;
    async fn get_venue(&self, id: i64) -> Result<Venue>;
    async fn create_venue(&self, form: VenueForm) -> Result<Venue>;
    async fn update_venue(&self, id: i64, form: VenueForm) -> Result<Venue>;
    /// Refuses with `HasDependents` while shows still reference the venue.
    async fn delete_venue(&self, id: i64) -> Result<Venue>;

    // Artist operations
    async fn list_artists(&self, now: NaiveDateTime) -> Result<Vec<ArtistSummary>>;
    async fn search_artists(&self, term: &str, now: NaiveDateTime) -> Result<SearchResults>;
    async fn artist_detail(&self, id: i64, now: NaiveDateTime) -> Result<ArtistDetail>;
    async fn get_artist(&self, id: i64) -> Result<Artist>;
    async fn create_artist(&self, form: ArtistForm) -> Result<Artist>;
    async fn update_artist(&self, id: i64, form: ArtistForm) -> Result<Artist>;

    // Show operations
    async fn list_shows(&self, page: u32, per_page: u32) -> Result<Page<ShowListing>>;
    async fn create_show(&self, form: ShowForm) -> Result<Show>;

    // Lookups for forms and the landing page
    async fn venue_choices(&self) -> Result<Vec<Choice>>;
    async fn artist_choices(&self) -> Result<Vec<Choice>>;
    async fn counts(&self) -> Result<CatalogCounts>;
}
